//! HTTP API Layer
//!
//! Thin boundary around the dispatcher and the telemetry stop signal:
//! `POST /work`, `POST /emitStop`, `GET /health`.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::AppState;
pub use server::{router, HttpServer, HttpServerConfig};
