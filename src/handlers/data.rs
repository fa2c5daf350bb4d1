//! Sample-data generation.
//!
//! Produces the canonical input files the other routines consume, so a fresh
//! deployment can be exercised end to end. Output is deterministic for a
//! given operator email: the email seeds the RNG.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rusqlite::{params, Connection};
use serde_json::{json, Value};

use super::{Handler, TaskContext};
use crate::error::AgentError;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Emma", "Frank", "Grace", "Henry", "Iris", "Jack",
];
const LAST_NAMES: &[&str] = &[
    "Anderson", "Brown", "Chen", "Davis", "Evans", "Fischer", "Garcia", "Hughes", "Ivanov",
    "Jones",
];
const COMMENT_POOL: &[&str] = &[
    "This works great on my machine.",
    "This works great on my machine!",
    "Could we add more tests here?",
    "The deployment failed again last night.",
    "Looks good to me, shipping it.",
    "Why does this function allocate so much?",
    "The docs are out of date.",
    "I could not reproduce the issue.",
    "Please rebase onto main before merging.",
    "The cache invalidation logic is subtle.",
    "Latency regressed after the last release.",
    "Nice catch, that was a real bug.",
];
const LOG_LEVELS: &[&str] = &["INFO", "WARN", "ERROR", "DEBUG"];
const LOG_MESSAGES: &[&str] = &[
    "request completed",
    "connection reset by peer",
    "cache miss",
    "retry scheduled",
    "worker started",
    "shutting down",
];
const TICKET_TYPES: &[&str] = &["Gold", "Silver", "Bronze"];

/// FNV-1a over the email, so the same operator always gets the same fixtures.
fn stable_seed(email: &str) -> u64 {
    email.bytes().fold(0xcbf2_9ce4_8422_2325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Generate the sample input files under the data root.
pub struct GenerateData;

#[async_trait]
impl Handler for GenerateData {
    fn name(&self) -> &str {
        "generate_data"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let email = ctx.config.user_email.clone();
        let mut rng = StdRng::seed_from_u64(stable_seed(&email));
        let mut files = Vec::new();

        // dates.txt: 100 ISO dates spread over 25 years.
        let base = NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid date");
        let dates: Vec<String> = (0..100)
            .map(|_| {
                (base + Duration::days(rng.gen_range(0..9000)))
                    .format("%Y-%m-%d")
                    .to_string()
            })
            .collect();
        let path = ctx.sandbox.path("dates.txt");
        ctx.sandbox.write(&path, dates.join("\n")).await?;
        files.push(path.display().to_string());

        // contacts.json: 30 unsorted records.
        let contacts: Vec<Value> = (0..30)
            .map(|_| {
                let first = *FIRST_NAMES.choose(&mut rng).expect("non-empty pool");
                let last = *LAST_NAMES.choose(&mut rng).expect("non-empty pool");
                json!({
                    "first_name": first,
                    "last_name": last,
                    "email": format!("{}.{}@example.org", first.to_lowercase(), last.to_lowercase()),
                })
            })
            .collect();
        let path = ctx.sandbox.path("contacts.json");
        ctx.sandbox
            .write(&path, serde_json::to_string_pretty(&contacts)?)
            .await?;
        files.push(path.display().to_string());

        // logs/: 15 small files with a timestamped first line.
        for i in 0..15 {
            let day = base + Duration::days(rng.gen_range(8000..9000));
            let lines: Vec<String> = (0..3)
                .map(|_| {
                    format!(
                        "{} [{}] {}",
                        day.format("%Y-%m-%d"),
                        LOG_LEVELS.choose(&mut rng).expect("non-empty pool"),
                        LOG_MESSAGES.choose(&mut rng).expect("non-empty pool"),
                    )
                })
                .collect();
            let path = ctx.sandbox.path(&format!("logs/log-{}.log", i));
            ctx.sandbox.write(&path, lines.join("\n")).await?;
        }
        files.push(ctx.sandbox.path("logs").display().to_string());

        // docs/: markdown files with a level-1 heading each.
        for (name, title) in [
            ("docs/overview.md", "Overview"),
            ("docs/setup.md", "Setup"),
            ("docs/api/reference.md", "API Reference"),
        ] {
            let path = ctx.sandbox.path(name);
            ctx.sandbox
                .write(&path, format!("# {}\n\nGenerated sample document.\n", title))
                .await?;
        }
        files.push(ctx.sandbox.path("docs").display().to_string());

        // email.txt: a message addressed to the operator.
        let first = *FIRST_NAMES.choose(&mut rng).expect("non-empty pool");
        let last = *LAST_NAMES.choose(&mut rng).expect("non-empty pool");
        let sender = format!("{}.{}@example.org", first.to_lowercase(), last.to_lowercase());
        let message = format!(
            "From: {first} {last} <{sender}>\nTo: <{email}>\nSubject: Quarterly report\n\n\
             Hi,\n\nPlease find the quarterly numbers attached.\n\nBest,\n{first}\n",
        );
        let path = ctx.sandbox.path("email.txt");
        ctx.sandbox.write(&path, message).await?;
        files.push(path.display().to_string());

        // comments.txt: 20 lines drawn from the pool.
        let comments: Vec<&str> = (0..20)
            .map(|_| *COMMENT_POOL.choose(&mut rng).expect("non-empty pool"))
            .collect();
        let path = ctx.sandbox.path("comments.txt");
        ctx.sandbox.write(&path, comments.join("\n")).await?;
        files.push(path.display().to_string());

        // format.md: deliberately unformatted markdown for the prettier task.
        let path = ctx.sandbox.path("format.md");
        ctx.sandbox
            .write(&path, "#  Sample   Report\n\n\n*  first item\n*   second item\n")
            .await?;
        files.push(path.display().to_string());

        // ticket-sales.db: 50 rows across the three ticket tiers.
        let db_path = ctx.sandbox.path("ticket-sales.db");
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let conn = Connection::open(&db_path)?;
        conn.execute_batch(
            "DROP TABLE IF EXISTS tickets;
             CREATE TABLE tickets (type TEXT, units INTEGER, price REAL);",
        )?;
        for _ in 0..50 {
            let ticket_type = *TICKET_TYPES.choose(&mut rng).expect("non-empty pool");
            let units: i64 = rng.gen_range(1..=10);
            let price = (rng.gen_range(10.0..200.0f64) * 100.0).round() / 100.0;
            conn.execute(
                "INSERT INTO tickets (type, units, price) VALUES (?1, ?2, ?3)",
                params![ticket_type, units, price],
            )?;
        }
        files.push(db_path.display().to_string());

        Ok(json!({
            "seeded_for": email,
            "files": files,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::context;

    #[tokio::test]
    async fn generates_the_canonical_fixture_set() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());

        GenerateData.run(&ctx, "datagen").await.unwrap();

        let dates = ctx
            .sandbox
            .read_to_string(&ctx.sandbox.path("dates.txt"))
            .await
            .unwrap();
        assert_eq!(dates.lines().count(), 100);
        for line in dates.lines() {
            NaiveDate::parse_from_str(line, "%Y-%m-%d").unwrap();
        }

        let contacts = ctx
            .sandbox
            .read_to_string(&ctx.sandbox.path("contacts.json"))
            .await
            .unwrap();
        let contacts: Vec<Value> = serde_json::from_str(&contacts).unwrap();
        assert_eq!(contacts.len(), 30);

        let conn = Connection::open(ctx.sandbox.path("ticket-sales.db")).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM tickets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 50);
    }

    #[tokio::test]
    async fn output_is_deterministic_for_one_operator() {
        let dir_a = tempfile::tempdir().unwrap();
        let dir_b = tempfile::tempdir().unwrap();
        let ctx_a = context(dir_a.path());
        let ctx_b = context(dir_b.path());

        GenerateData.run(&ctx_a, "datagen").await.unwrap();
        GenerateData.run(&ctx_b, "datagen").await.unwrap();

        let a = ctx_a
            .sandbox
            .read_to_string(&ctx_a.sandbox.path("dates.txt"))
            .await
            .unwrap();
        let b = ctx_b
            .sandbox
            .read_to_string(&ctx_b.sandbox.path("dates.txt"))
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn generated_fixtures_feed_the_other_routines() {
        use crate::handlers::{CountWednesdays, SimilarComments, SortContacts};

        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        GenerateData.run(&ctx, "datagen").await.unwrap();

        CountWednesdays.run(&ctx, "count wednesdays").await.unwrap();
        SortContacts.run(&ctx, "sort contacts").await.unwrap();
        SimilarComments
            .run(&ctx, "find similar comments")
            .await
            .unwrap();
    }
}
