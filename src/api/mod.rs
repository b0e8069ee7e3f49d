//! HTTP layer: the gate middleware and the service's own endpoints.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for response serialization
//! - [`handlers`] - HTTP request handlers
//! - [`middleware`] - Gate and request processing middleware

pub mod dto;
pub mod handlers;
pub mod middleware;
