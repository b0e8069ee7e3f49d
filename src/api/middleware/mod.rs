//! HTTP middleware for request protection and observability.
//!
//! Every protection is usable as its own layer; [`gate::layer`] composes
//! them into the single entry point the server installs.

pub mod authorize;
pub mod csrf;
pub mod gate;
pub mod rate_limit;
pub mod security_headers;
pub mod tracing;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Counts a rejection and converts it into its response.
pub(crate) fn reject(err: AppError) -> Response {
    metrics::counter!("campus_gate_rejections_total", "reason" => err.reason()).increment(1);
    err.into_response()
}
