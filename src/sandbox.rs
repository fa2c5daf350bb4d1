//! Sandboxed file accessor.
//!
//! Every path a task routine touches must lie under a single root directory
//! (`/data` in production). Validation is a lexical prefix check only; `..`
//! segments and symlinks are not resolved. Deletion is a capability this
//! accessor does not grant: the delete operations exist solely to fail.

use std::path::{Path, PathBuf};

use crate::error::AgentError;

/// The fixed data root all production file operations stay under.
pub const DATA_ROOT: &str = "/data";

/// Validates and performs all file access on behalf of the task routines.
#[derive(Debug, Clone)]
pub struct Sandbox {
    root: PathBuf,
    prefix: String,
}

impl Sandbox {
    /// Create an accessor rooted at `root`. Tests point this at a temp dir.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let mut prefix = root.to_string_lossy().into_owned();
        if !prefix.ends_with('/') {
            prefix.push('/');
        }
        Self { root, prefix }
    }

    /// The production accessor, rooted at [`DATA_ROOT`].
    pub fn standard() -> Self {
        Self::new(DATA_ROOT)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that `path` lies under the root and return it as a `PathBuf`.
    ///
    /// # Errors
    ///
    /// `AccessDenied` for any path that is not prefixed by `<root>/`.
    pub fn validate(&self, path: &str) -> Result<PathBuf, AgentError> {
        if path.starts_with(&self.prefix) {
            Ok(PathBuf::from(path))
        } else {
            Err(AgentError::AccessDenied(path.to_string()))
        }
    }

    /// Join a relative path onto the root. Infallible by construction, used
    /// by routines that address their fixed input/output files.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel.trim_start_matches('/'))
    }

    /// Read a sandboxed file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// `NotFound` if the file does not exist, `AccessDenied` if outside root.
    pub async fn read_to_string(&self, path: &Path) -> Result<String, AgentError> {
        let path = self.validate(&path.to_string_lossy())?;
        if !path.exists() {
            return Err(AgentError::NotFound(path.display().to_string()));
        }
        Ok(tokio::fs::read_to_string(&path).await?)
    }

    /// Read a sandboxed file as raw bytes.
    pub async fn read(&self, path: &Path) -> Result<Vec<u8>, AgentError> {
        let path = self.validate(&path.to_string_lossy())?;
        if !path.exists() {
            return Err(AgentError::NotFound(path.display().to_string()));
        }
        Ok(tokio::fs::read(&path).await?)
    }

    /// Write a sandboxed file, creating parent directories as needed.
    pub async fn write(&self, path: &Path, contents: impl AsRef<[u8]>) -> Result<(), AgentError> {
        let path = self.validate(&path.to_string_lossy())?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, contents).await?;
        Ok(())
    }

    /// Create a directory (and parents) under the root.
    pub async fn create_dir_all(&self, path: &Path) -> Result<(), AgentError> {
        let path = self.validate(&path.to_string_lossy())?;
        tokio::fs::create_dir_all(&path).await?;
        Ok(())
    }

    /// Deletion is permanently disabled, for any path.
    pub fn remove_file(&self, _path: &Path) -> Result<(), AgentError> {
        Err(AgentError::OperationForbidden)
    }

    /// Recursive deletion is permanently disabled, for any path.
    pub fn remove_dir_all(&self, _path: &Path) -> Result<(), AgentError> {
        Err(AgentError::OperationForbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_paths_under_root() {
        let sandbox = Sandbox::new("/data");
        assert!(sandbox.validate("/data/dates.txt").is_ok());
        assert!(sandbox.validate("/data/docs/index.json").is_ok());
    }

    #[test]
    fn validate_rejects_paths_outside_root() {
        let sandbox = Sandbox::new("/data");
        for path in ["/etc/passwd", "/tmp/x", "data/relative.txt", "/"] {
            match sandbox.validate(path) {
                Err(AgentError::AccessDenied(p)) => assert_eq!(p, path),
                other => panic!("expected AccessDenied for {path}, got {other:?}"),
            }
        }
    }

    #[test]
    fn validate_rejects_sibling_directories_sharing_the_prefix_text() {
        // "/database" must not pass just because it starts with "/data".
        let sandbox = Sandbox::new("/data");
        assert!(matches!(
            sandbox.validate("/database/file.db"),
            Err(AgentError::AccessDenied(_))
        ));
    }

    #[test]
    fn deletion_always_fails() {
        let sandbox = Sandbox::new("/data");
        assert!(matches!(
            sandbox.remove_file(Path::new("/data/anything.txt")),
            Err(AgentError::OperationForbidden)
        ));
        assert!(matches!(
            sandbox.remove_dir_all(Path::new("/data")),
            Err(AgentError::OperationForbidden)
        ));
        // Even for paths that would fail validation anyway.
        assert!(matches!(
            sandbox.remove_file(Path::new("/etc/passwd")),
            Err(AgentError::OperationForbidden)
        ));
    }

    #[tokio::test]
    async fn read_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = Sandbox::new(dir.path());
        let missing = sandbox.path("missing.txt");
        assert!(matches!(
            sandbox.read_to_string(&missing).await,
            Err(AgentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let sandbox = Sandbox::new(dir.path());
        let file = sandbox.path("nested/dir/out.txt");
        sandbox.write(&file, "hello").await.unwrap();
        assert_eq!(sandbox.read_to_string(&file).await.unwrap(), "hello");
    }
}
