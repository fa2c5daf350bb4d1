//! Most-similar comment pair scan.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{Handler, TaskContext};
use crate::error::AgentError;
use crate::similarity::similarity_ratio;

/// Find the two most similar lines in `/data/comments.txt`.
///
/// Pairwise scan over every unordered pair; the maximum-ratio pair wins and
/// ties keep the first pair encountered.
pub struct SimilarComments;

#[async_trait]
impl Handler for SimilarComments {
    fn name(&self) -> &str {
        "similar_comments"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let input = ctx.sandbox.path("comments.txt");
        let output = ctx.sandbox.path("comments-similar.txt");

        let contents = ctx.sandbox.read_to_string(&input).await?;
        let comments: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        if comments.len() < 2 {
            return Err(AgentError::BadRequest(
                "At least 2 comments are required to find a similar pair".to_string(),
            ));
        }

        let mut best = (0usize, 1usize);
        let mut best_ratio = f64::MIN;
        for i in 0..comments.len() {
            for j in (i + 1)..comments.len() {
                let ratio = similarity_ratio(comments[i], comments[j]);
                if ratio > best_ratio {
                    best_ratio = ratio;
                    best = (i, j);
                }
            }
        }

        let pair = format!("{}\n{}", comments[best.0], comments[best.1]);
        ctx.sandbox.write(&output, &pair).await?;

        Ok(json!({
            "ratio": best_ratio,
            "output": output.display().to_string(),
        }))
    }
}
