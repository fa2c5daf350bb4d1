//! File conversion routines: image resizing, Markdown rendering, CSV filtering.

use std::io::Cursor;

use async_trait::async_trait;
use image::imageops::FilterType;
use image::ImageFormat;
use serde_json::{json, Map, Value};

use super::{Handler, TaskContext};
use crate::error::AgentError;

const MAX_WIDTH: u32 = 800;

/// Resize `/data/image.png` down to at most 800px wide, preserving aspect.
pub struct ResizeImage;

#[async_trait]
impl Handler for ResizeImage {
    fn name(&self) -> &str {
        "resize_image"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("image.png");
        let output = ctx.sandbox.path("image-resized.png");

        let bytes = ctx.sandbox.read(&input).await?;
        let img = image::load_from_memory(&bytes)?;

        let (width, height) = (img.width(), img.height());
        let img = if width > MAX_WIDTH {
            let new_height = ((height as u64 * MAX_WIDTH as u64) / width as u64).max(1) as u32;
            img.resize_exact(MAX_WIDTH, new_height, FilterType::Lanczos3)
        } else {
            img
        };

        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, ImageFormat::Png)?;
        ctx.sandbox.write(&output, buf.into_inner()).await?;

        Ok(json!({
            "width": img.width(),
            "height": img.height(),
            "output": output.display().to_string(),
        }))
    }
}

/// Render `/data/input.md` to HTML at `/data/output.html`.
pub struct MarkdownToHtml;

#[async_trait]
impl Handler for MarkdownToHtml {
    fn name(&self) -> &str {
        "markdown_to_html"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("input.md");
        let output = ctx.sandbox.path("output.html");

        let markdown = ctx.sandbox.read_to_string(&input).await?;
        let parser = pulldown_cmark::Parser::new(&markdown);
        let mut html = String::new();
        pulldown_cmark::html::push_html(&mut html, parser);

        ctx.sandbox.write(&output, &html).await?;

        Ok(json!({ "output": output.display().to_string() }))
    }
}

const FILTER_COLUMN: &str = "status";
const FILTER_VALUE: &str = "active";

/// Keep the rows of `/data/data.csv` whose `status` column is `active`,
/// written out as a JSON array of records.
pub struct FilterCsv;

#[async_trait]
impl Handler for FilterCsv {
    fn name(&self) -> &str {
        "filter_csv"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("data.csv");
        let output = ctx.sandbox.path("filtered.json");

        let bytes = ctx.sandbox.read(&input).await?;
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let headers = reader
            .headers()
            .map_err(|e| AgentError::BadRequest(format!("unreadable CSV header: {}", e)))?
            .clone();
        let filter_idx = headers
            .iter()
            .position(|h| h == FILTER_COLUMN)
            .ok_or_else(|| {
                AgentError::BadRequest(format!("CSV has no '{}' column", FILTER_COLUMN))
            })?;

        let mut records = Vec::new();
        for row in reader.records() {
            let row = row.map_err(|e| AgentError::BadRequest(format!("bad CSV row: {}", e)))?;
            if row.get(filter_idx) != Some(FILTER_VALUE) {
                continue;
            }
            let mut record = Map::new();
            for (header, field) in headers.iter().zip(row.iter()) {
                record.insert(header.to_string(), Value::String(field.to_string()));
            }
            records.push(Value::Object(record));
        }

        let body = serde_json::to_string_pretty(&Value::Array(records.clone()))?;
        ctx.sandbox.write(&output, &body).await?;

        Ok(json!({
            "matched": records.len(),
            "output": output.display().to_string(),
        }))
    }
}
