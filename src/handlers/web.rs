//! Remote HTTP routines: JSON fetch and website scraping.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

use super::{Handler, TaskContext};
use crate::error::AgentError;

const API_URL: &str = "https://api.example.com";
const SCRAPE_URL: &str = "https://example.com";

/// Fetch JSON from the remote API and store it pretty-printed.
pub struct FetchApi;

#[async_trait]
impl Handler for FetchApi {
    fn name(&self) -> &str {
        "fetch_api"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let output = ctx.sandbox.path("output.json");

        let response = ctx
            .http
            .get(API_URL)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Provider(format!(
                "Failed to fetch data: HTTP {}",
                status
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("invalid JSON response: {}", e)))?;

        ctx.sandbox
            .write(&output, serde_json::to_string_pretty(&body)?)
            .await?;

        Ok(json!({ "output": output.display().to_string() }))
    }
}

static SCRIPT_STYLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<(script|style)[^>]*>.*?</(script|style)>").unwrap());
static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Strip markup down to readable text: drop script/style blocks, drop tags,
/// decode the common entities, collapse blank runs.
fn html_to_text(html: &str) -> String {
    let without_blocks = SCRIPT_STYLE.replace_all(html, " ");
    let without_tags = TAG.replace_all(&without_blocks, " ");
    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");

    decoded
        .lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Download the target page and store its visible text.
pub struct ScrapeWebsite;

#[async_trait]
impl Handler for ScrapeWebsite {
    fn name(&self) -> &str {
        "scrape_website"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let output = ctx.sandbox.path("scraped.txt");

        let response = ctx
            .http
            .get(SCRAPE_URL)
            .send()
            .await
            .map_err(|e| AgentError::Provider(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AgentError::Provider(format!(
                "Failed to fetch page: HTTP {}",
                status
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AgentError::Provider(format!("unreadable response body: {}", e)))?;
        let text = html_to_text(&html);

        ctx.sandbox.write(&output, &text).await?;

        Ok(json!({
            "characters": text.len(),
            "output": output.display().to_string(),
        }))
    }
}
