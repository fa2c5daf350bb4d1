//! HTTP API for the automation agent.
//!
//! ## Endpoints
//!
//! - `POST /run?task=<text>` - Dispatch a free-text task to a routine
//! - `GET /read?path=<path>` - Read a sandboxed file back as plain text
//! - `GET /` - Static welcome payload

mod routes;

pub use routes::{serve, AppState};
