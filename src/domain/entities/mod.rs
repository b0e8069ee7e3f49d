//! Core domain entities.
//!
//! - [`RateRecord`] - Per-client request count within a rate-limit window
//! - [`Session`] / [`Role`] - Authenticated portal session read by the gate

pub mod rate_record;
pub mod session;

pub use rate_record::RateRecord;
pub use session::{Role, Session};
