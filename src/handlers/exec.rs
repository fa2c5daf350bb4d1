//! Routines that shell out to external tools.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::process::Command;

use super::{Handler, TaskContext};
use crate::error::AgentError;

/// Run a command and return its stdout; a non-zero exit is an `Exec` error
/// carrying stderr (or stdout when stderr is empty).
async fn run_command(program: &str, args: &[&str], cwd: Option<&Path>) -> Result<String, AgentError> {
    let mut command = Command::new(program);
    command.args(args).stdout(Stdio::piped()).stderr(Stdio::piped());
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = command
        .output()
        .await
        .map_err(|e| AgentError::Exec(format!("failed to run {}: {}", program, e)))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        if stderr.is_empty() {
            return Err(AgentError::Exec(format!(
                "{} failed: {}",
                program,
                stdout.trim()
            )));
        }
        return Err(AgentError::Exec(format!(
            "{} error: {}",
            program,
            stderr.trim()
        )));
    }

    Ok(stdout.to_string())
}

/// Format `/data/format.md` in place with prettier.
pub struct FormatWithPrettier;

#[async_trait]
impl Handler for FormatWithPrettier {
    fn name(&self) -> &str {
        "format_with_prettier"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let target = ctx.sandbox.path("format.md");
        if !target.exists() {
            return Err(AgentError::NotFound(target.display().to_string()));
        }

        let target_str = target.display().to_string();
        run_command("prettier", &["--write", &target_str], None).await?;

        Ok(json!({ "formatted": target_str }))
    }
}

const REPO_URL: &str = "https://github.com/user/repo.git";

/// Clone a fixed repository into `/data/repo` and create an automated commit.
pub struct GitCloneCommit;

#[async_trait]
impl Handler for GitCloneCommit {
    fn name(&self) -> &str {
        "git_clone_commit"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let repo_dir = ctx.sandbox.path("repo");
        let repo_dir_str = repo_dir.display().to_string();

        run_command("git", &["clone", REPO_URL, &repo_dir_str], None).await?;
        run_command(
            "git",
            &["commit", "-am", "Automated commit"],
            Some(&repo_dir),
        )
        .await?;

        Ok(json!({ "repo": repo_dir_str }))
    }
}
