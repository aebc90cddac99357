//! `fleetdash-core`: shared building blocks for the fleet dashboard.
//!
//! Pure code only: error model, identifiers and calendar formatting. Nothing in
//! here talks to the network.

pub mod dates;
pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::UserId;
