//! Domain layer containing the gate's entities and contracts.
//!
//! # Architecture
//!
//! - [`entities`] - Rate records and sessions
//! - [`repositories`] - State access trait definitions
//! - [`request`] - Structured view of the consumed request surface
//! - [`route_map`] - Path and method classification
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Decisions are made in services (see [`crate::application::services`])

pub mod entities;
pub mod repositories;
pub mod request;
pub mod route_map;
