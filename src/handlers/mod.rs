//! Task routines.
//!
//! Each routine is an independent unit of work: it validates that its fixed
//! input files exist, reads and transforms them, writes output files under
//! the sandbox, and returns a small JSON summary. Routines share nothing
//! with one another; a failure in one never affects the rest.
//!
//! Routines address their inputs by fixed paths under the data root, the way
//! the task descriptions refer to them (`/data/dates.txt`, `/data/docs/`, ...).

mod comments;
mod convert;
mod data;
mod exec;
mod extract;
mod files;
mod sql;
mod web;

pub use comments::SimilarComments;
pub use convert::{FilterCsv, MarkdownToHtml, ResizeImage};
pub use data::GenerateData;
pub use exec::{FormatWithPrettier, GitCloneCommit};
pub use extract::{CreditCardNumber, EmailSender, TranscribeAudio};
pub use files::{CountWednesdays, DocsIndex, RecentLogs, SortContacts};
pub use sql::{GoldTicketSales, RunSqlQuery};
pub use web::{FetchApi, ScrapeWebsite};

use async_trait::async_trait;
use serde_json::Value;

use crate::config::Config;
use crate::error::AgentError;
use crate::llm::AiProxyClient;
use crate::sandbox::Sandbox;

/// Everything a routine may touch: configuration, the sandboxed file
/// accessor, the completion provider, and a shared HTTP client.
///
/// Constructed once at startup and passed by reference into every request.
pub struct TaskContext {
    pub config: Config,
    pub sandbox: Sandbox,
    pub llm: AiProxyClient,
    pub http: reqwest::Client,
}

impl TaskContext {
    pub fn new(config: Config, sandbox: Sandbox) -> Self {
        let llm = AiProxyClient::new(config.aiproxy_token.clone());
        Self {
            config,
            sandbox,
            llm,
            http: reqwest::Client::new(),
        }
    }
}

/// One fixed automation routine.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Stable routine name, used in logs and results.
    fn name(&self) -> &str;

    /// Execute the routine. `task` is the original free-text description,
    /// available to routines that pull parameters out of it.
    async fn run(&self, ctx: &TaskContext, task: &str) -> Result<Value, AgentError>;
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    /// A context rooted at a temp directory, for exercising file routines.
    pub fn context(root: &std::path::Path) -> TaskContext {
        TaskContext::new(
            Config::new("test-token".to_string(), "tester@example.com".to_string()),
            Sandbox::new(root),
        )
    }
}
