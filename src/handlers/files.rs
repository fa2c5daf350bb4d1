//! Local file parsing routines: dates, contacts, logs, and the docs index.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use walkdir::WalkDir;

use super::{Handler, TaskContext};
use crate::error::AgentError;

/// Count lines in `/data/dates.txt` that fall on a Wednesday.
///
/// Each line is parsed as `YYYY-MM-DD`; unparsable lines are skipped.
pub struct CountWednesdays;

#[async_trait]
impl Handler for CountWednesdays {
    fn name(&self) -> &str {
        "count_wednesdays"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("dates.txt");
        let output = ctx.sandbox.path("dates-wednesdays.txt");

        let contents = ctx.sandbox.read_to_string(&input).await?;
        let count = contents
            .lines()
            .filter_map(|line| NaiveDate::parse_from_str(line.trim(), "%Y-%m-%d").ok())
            .filter(|date| date.weekday() == Weekday::Wed)
            .count();

        ctx.sandbox.write(&output, count.to_string()).await?;

        Ok(json!({
            "wednesdays": count,
            "output": output.display().to_string(),
        }))
    }
}

/// Sort the contact records in `/data/contacts.json` by `(last_name, first_name)`.
pub struct SortContacts;

fn contact_key(contact: &Map<String, Value>, field: &str) -> String {
    contact
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_string()
}

#[async_trait]
impl Handler for SortContacts {
    fn name(&self) -> &str {
        "sort_contacts"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("contacts.json");
        let output = ctx.sandbox.path("contacts-sorted.json");

        let contents = ctx.sandbox.read_to_string(&input).await?;
        let mut contacts: Vec<Map<String, Value>> = serde_json::from_str(&contents)?;

        // Vec::sort_by is stable, so equal keys keep their input order.
        contacts.sort_by(|a, b| {
            (contact_key(a, "last_name"), contact_key(a, "first_name"))
                .cmp(&(contact_key(b, "last_name"), contact_key(b, "first_name")))
        });

        let sorted = serde_json::to_string_pretty(&contacts)?;
        ctx.sandbox.write(&output, &sorted).await?;

        Ok(json!({
            "contacts": contacts.len(),
            "output": output.display().to_string(),
        }))
    }
}

/// First line of the 10 most recent `*.log` files in `/data/logs/`,
/// most recent first.
pub struct RecentLogs;

#[async_trait]
impl Handler for RecentLogs {
    fn name(&self) -> &str {
        "recent_logs"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let logs_dir = ctx.sandbox.path("logs");
        let output = ctx.sandbox.path("logs-recent.txt");

        if !logs_dir.is_dir() {
            return Err(AgentError::NotFound(logs_dir.display().to_string()));
        }

        let mut entries = Vec::new();
        let mut dir = tokio::fs::read_dir(&logs_dir).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("log") {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            entries.push((modified, path));
        }
        entries.sort_by(|a, b| b.0.cmp(&a.0));

        let mut first_lines = Vec::new();
        for (_, path) in entries.iter().take(10) {
            let contents = ctx.sandbox.read_to_string(path).await?;
            first_lines.push(contents.lines().next().unwrap_or("").to_string());
        }

        ctx.sandbox.write(&output, first_lines.join("\n")).await?;

        Ok(json!({
            "logs": first_lines.len(),
            "output": output.display().to_string(),
        }))
    }
}

static H1_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+(.+)$").unwrap());

/// Map every `.md` file under `/data/docs/` to its first level-1 heading.
pub struct DocsIndex;

#[async_trait]
impl Handler for DocsIndex {
    fn name(&self) -> &str {
        "docs_index"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let docs_dir = ctx.sandbox.path("docs");
        let output = ctx.sandbox.path("docs/index.json");

        if !docs_dir.is_dir() {
            return Err(AgentError::NotFound(docs_dir.display().to_string()));
        }

        let mut index = Map::new();
        for entry in WalkDir::new(&docs_dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|e| e.to_str()) != Some("md")
            {
                continue;
            }

            let contents = ctx.sandbox.read_to_string(path).await?;
            // First matching line in document order wins.
            let title = contents
                .lines()
                .find_map(|line| H1_HEADING.captures(line))
                .map(|caps| caps[1].trim().to_string());

            if let Some(title) = title {
                let rel = path
                    .strip_prefix(&docs_dir)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .into_owned();
                index.insert(rel, Value::String(title));
            }
        }

        let body = serde_json::to_string_pretty(&Value::Object(index.clone()))?;
        ctx.sandbox.write(&output, &body).await?;

        Ok(json!({
            "documents": index.len(),
            "output": output.display().to_string(),
        }))
    }
}
