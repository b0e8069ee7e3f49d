use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Message used when a rate-limit policy carries none.
pub const DEFAULT_RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later.";

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

/// Terminal outcomes of the gate.
///
/// Every variant is converted into a response at the point of detection;
/// nothing propagates past the middleware.
#[derive(Debug, Error)]
pub enum AppError {
    /// Client exceeded its quota for the current window.
    #[error("{message}")]
    RateExceeded { message: String, retry_after: u64 },

    /// Missing or mismatched anti-forgery token on a mutating request.
    #[error("Invalid CSRF token")]
    CsrfMismatch,

    /// Route needs a session and none is present.
    #[error("Authentication required")]
    Unauthenticated { sign_in: String },

    /// Session present but its role does not grant access.
    #[error("Insufficient role")]
    Forbidden { sign_in: String },

    /// Path that cannot be decoded or escapes the root with `..`.
    #[error("Invalid request path")]
    InvalidPath,

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn rate_exceeded(message: impl Into<String>, retry_after: u64) -> Self {
        Self::RateExceeded {
            message: message.into(),
            retry_after,
        }
    }
    pub fn unauthenticated(sign_in: impl Into<String>) -> Self {
        Self::Unauthenticated {
            sign_in: sign_in.into(),
        }
    }
    pub fn forbidden(sign_in: impl Into<String>) -> Self {
        Self::Forbidden {
            sign_in: sign_in.into(),
        }
    }
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Label used for the rejection metric.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::RateExceeded { .. } => "rate_limit",
            AppError::CsrfMismatch => "csrf",
            AppError::Unauthenticated { .. } => "unauthenticated",
            AppError::Forbidden { .. } => "forbidden",
            AppError::InvalidPath => "invalid_path",
            AppError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::RateExceeded {
                message,
                retry_after,
            } => {
                let body = ErrorBody {
                    error: message,
                    retry_after: Some(retry_after),
                };
                let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            AppError::CsrfMismatch => {
                let body = ErrorBody {
                    error: "Invalid CSRF token".to_string(),
                    retry_after: None,
                };
                (StatusCode::FORBIDDEN, Json(body)).into_response()
            }
            AppError::InvalidPath => {
                let body = ErrorBody {
                    error: "Invalid request path".to_string(),
                    retry_after: None,
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }
            AppError::Unauthenticated { sign_in } | AppError::Forbidden { sign_in } => {
                Redirect::temporary(&sign_in).into_response()
            }
            AppError::Internal(_) => {
                let body = ErrorBody {
                    error: "Internal server error".to_string(),
                    retry_after: None,
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
