//! HTTP route handlers.

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::dispatch::Registry;
use crate::error::AgentError;
use crate::handlers::TaskContext;
use crate::sandbox::Sandbox;

/// Shared application state: built once in [`serve`], read-only afterwards.
pub struct AppState {
    pub ctx: TaskContext,
    pub registry: Registry,
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = Arc::new(AppState {
        ctx: TaskContext::new(config.clone(), Sandbox::standard()),
        registry: Registry::standard(),
    });

    let app = router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/run", post(run_task))
        .route("/read", get(read_file))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Wait for SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Static welcome payload.
async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the LLM-based Automation Agent API" }))
}

#[derive(Debug, Deserialize)]
struct RunQuery {
    task: String,
}

/// Dispatch a task description to the first matching routine.
async fn run_task(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RunQuery>,
) -> Result<Json<Value>, AgentError> {
    let handler = state
        .registry
        .dispatch(&query.task)
        .ok_or_else(|| AgentError::UnknownTask(query.task.clone()))?;

    tracing::info!(routine = handler.name(), task = %query.task, "dispatching task");

    let result = handler.run(&state.ctx, &query.task).await?;

    Ok(Json(json!({ "status": "success", "result": result })))
}

#[derive(Debug, Deserialize)]
struct ReadQuery {
    path: String,
}

/// Read a sandboxed file back as plain text, surrounding whitespace trimmed.
async fn read_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReadQuery>,
) -> Result<String, AgentError> {
    let contents = state
        .ctx
        .sandbox
        .read_to_string(Path::new(&query.path))
        .await?;
    Ok(contents.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(root: &std::path::Path) -> Arc<AppState> {
        Arc::new(AppState {
            ctx: TaskContext::new(
                Config::new("test-token".to_string(), "tester@example.com".to_string()),
                Sandbox::new(root),
            ),
            registry: Registry::standard(),
        })
    }

    #[tokio::test]
    async fn run_rejects_unknown_tasks_with_the_original_text() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let err = run_task(
            State(state),
            Query(RunQuery {
                task: "fold the laundry".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Unknown task: fold the laundry");
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn run_wraps_routine_results_in_the_success_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        state
            .ctx
            .sandbox
            .write(&state.ctx.sandbox.path("dates.txt"), "2024-01-03\n")
            .await
            .unwrap();

        let Json(body) = run_task(
            State(state),
            Query(RunQuery {
                task: "how many dates fall on a wednesday?".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(body["status"], "success");
        assert_eq!(body["result"]["wednesdays"], 1);
    }

    #[tokio::test]
    async fn read_returns_trimmed_contents() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let file = state.ctx.sandbox.path("note.txt");
        state.ctx.sandbox.write(&file, "  hello\n").await.unwrap();

        let body = read_file(
            State(state),
            Query(ReadQuery {
                path: file.display().to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn read_outside_the_sandbox_is_denied() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let err = read_file(
            State(state),
            Query(ReadQuery {
                path: "/etc/passwd".to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AgentError::AccessDenied(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn read_missing_sandboxed_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());
        let missing = state.ctx.sandbox.path("missing.txt");

        let err = read_file(
            State(state),
            Query(ReadQuery {
                path: missing.display().to_string(),
            }),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AgentError::NotFound(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::NOT_FOUND);
    }
}
