//! # Automation Agent
//!
//! An LLM-based task-automation HTTP service. A free-text task description
//! arrives on `POST /run`, an ordered keyword registry picks one of the
//! fixed automation routines, the routine runs against files under the
//! sandboxed data directory, and a JSON result comes back. `GET /read`
//! returns sandboxed file contents as plain text.
//!
//! ## Request Flow
//! 1. HTTP front receives the task text
//! 2. The dispatcher matches it against the ordered predicate registry
//! 3. The routine reads/writes files through the sandboxed accessor,
//!    optionally calling the completion provider
//! 4. The result (or the first error) bubbles back as JSON
//!
//! ## Modules
//! - `api`: HTTP endpoints and the shared application state
//! - `dispatch`: ordered keyword predicates over the routine registry
//! - `handlers`: the fixed automation routines
//! - `llm`: completion provider client (text, vision, audio)
//! - `sandbox`: validated file access under the data root

pub mod api;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod sandbox;
pub mod similarity;

pub use config::Config;
pub use error::AgentError;
