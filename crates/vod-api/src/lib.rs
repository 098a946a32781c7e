//! Axum HTTP API server.
//!
//! This crate provides:
//! - The public video, playlist, subscription and history REST API
//! - JWT bearer authentication
//! - Signed media-provider webhook intake
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod params;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
