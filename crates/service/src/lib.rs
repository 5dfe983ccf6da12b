//! ShadowNet service: stores named pipeline definitions, uploads through
//! them and serves shadow URLs back over HTTP.
//!
//! - Database (SQLite store of pipeline definitions)
//! - State management (ServiceState for database + component registry)
//! - HTTP handlers (gateway, pipeline API, health checks) and a typed client
//! - Process bootstrap (logging, signal handling, graceful shutdown)

pub mod config;
pub mod database;
pub mod http;
pub mod process;
pub mod state;

// Re-export key types for convenience
pub use config::Config;
pub use database::{Database, DatabaseSetupError};
pub use http::api::client::{ApiClient, ApiError, ApiRequest};
pub use process::{init_logging, spawn_service, ProcessError};
pub use state::{State as ServiceState, StateSetupError};
