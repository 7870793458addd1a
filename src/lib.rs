//! Data access for the lecturer and course section scheduler.
//!
//! - [`api::ApiClient`]: REST client with a per-instance response cache that
//!   is invalidated by resource prefix after every mutation.
//! - [`roster::AssignmentController`]: mirrors lecturer/course assignments
//!   and assigns class labels `A`..`Z` per course.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod roster;

#[cfg(test)]
mod test_support;

pub use error::{Error, Result};
