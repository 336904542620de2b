//! # Actix Middleware Library
//!
//! Middleware shared by the matchmate HTTP service
//!
//! ## Modules
//! - `jwt_auth`: bearer token validation, exposes [`UserId`]
//! - `logging`: request/response logging through tracing
//! - `metrics`: Prometheus request counters and latency histogram
//! - `request_id`: `x-request-id` propagation

pub mod jwt_auth;
pub mod logging;
pub mod metrics;
pub mod request_id;

pub use jwt_auth::{JwtAuthMiddleware, UserId};
pub use logging::Logging;
pub use metrics::MetricsMiddleware;
pub use request_id::RequestId;
