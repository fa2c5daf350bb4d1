//! SQLite routines over databases in the data root.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use serde_json::{json, Map, Value};

use super::{Handler, TaskContext};
use crate::error::AgentError;

/// Total Gold ticket revenue: `SUM(units * price)` over `/data/ticket-sales.db`.
pub struct GoldTicketSales;

#[async_trait]
impl Handler for GoldTicketSales {
    fn name(&self) -> &str {
        "gold_ticket_sales"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let db_path = ctx.sandbox.path("ticket-sales.db");
        let output = ctx.sandbox.path("ticket-sales-gold.txt");

        if !db_path.exists() {
            return Err(AgentError::NotFound(db_path.display().to_string()));
        }

        let conn = Connection::open(&db_path)?;
        let total: Option<f64> = conn.query_row(
            "SELECT SUM(units * price) FROM tickets WHERE type = 'Gold'",
            [],
            |row| row.get(0),
        )?;
        let total = total.unwrap_or(0.0);
        drop(conn);

        ctx.sandbox.write(&output, total.to_string()).await?;

        Ok(json!({
            "total": total,
            "output": output.display().to_string(),
        }))
    }
}

/// Run a SQL query against `/data/database.db` and return the rows.
///
/// The query is a fixed literal rather than derived from the task text,
/// preserved as-is from the original behavior.
pub struct RunSqlQuery;

const QUERY: &str = "SELECT * FROM table_name;";

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => json!(i),
        ValueRef::Real(f) => json!(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::String(BASE64.encode(b)),
    }
}

#[async_trait]
impl Handler for RunSqlQuery {
    fn name(&self) -> &str {
        "run_sql_query"
    }

    async fn run(&self, ctx: &TaskContext, _task: &str) -> Result<Value, AgentError> {
        let db_path = ctx.sandbox.path("database.db");

        if !db_path.exists() {
            return Err(AgentError::NotFound(db_path.display().to_string()));
        }

        let conn = Connection::open(&db_path)?;
        let mut stmt = conn.prepare(QUERY)?;
        let columns: Vec<String> = stmt.column_names().iter().map(|c| c.to_string()).collect();

        let mut rows = stmt.query([])?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Map::new();
            for (i, column) in columns.iter().enumerate() {
                record.insert(column.clone(), column_value(row.get_ref(i)?));
            }
            result.push(Value::Object(record));
        }

        Ok(json!({
            "query": QUERY,
            "rows": result,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::testutil::context;

    fn seed_ticket_db(path: &std::path::Path) {
        let conn = Connection::open(path).unwrap();
        conn.execute_batch(
            "CREATE TABLE tickets (type TEXT, units INTEGER, price REAL);
             INSERT INTO tickets VALUES ('Gold', 2, 100.0);
             INSERT INTO tickets VALUES ('Gold', 1, 50.0);
             INSERT INTO tickets VALUES ('Silver', 10, 10.0);",
        )
        .unwrap();
    }

    #[tokio::test]
    async fn sums_gold_ticket_revenue_only() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        seed_ticket_db(&ctx.sandbox.path("ticket-sales.db"));

        let result = GoldTicketSales
            .run(&ctx, "total gold ticket sales")
            .await
            .unwrap();
        assert_eq!(result["total"], 250.0);

        let written = ctx
            .sandbox
            .read_to_string(&ctx.sandbox.path("ticket-sales-gold.txt"))
            .await
            .unwrap();
        assert_eq!(written, "250");
    }

    #[tokio::test]
    async fn missing_database_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        assert!(matches!(
            GoldTicketSales.run(&ctx, "total gold ticket sales").await,
            Err(AgentError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn run_sql_query_returns_rows_as_objects() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path());
        let conn = Connection::open(ctx.sandbox.path("database.db")).unwrap();
        conn.execute_batch(
            "CREATE TABLE table_name (id INTEGER, name TEXT);
             INSERT INTO table_name VALUES (1, 'alpha');
             INSERT INTO table_name VALUES (2, 'beta');",
        )
        .unwrap();
        drop(conn);

        let result = RunSqlQuery.run(&ctx, "run sql query").await.unwrap();
        let rows = result["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], 1);
        assert_eq!(rows[1]["name"], "beta");
    }
}
