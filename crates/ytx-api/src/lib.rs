//! Axum HTTP API server.
//!
//! This crate provides:
//! - `POST /fetch-transcript/` returning a simplified explanation of one or
//!   more YouTube videos
//! - Health checks and Prometheus metrics
//! - Security headers, request IDs and request logging

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
