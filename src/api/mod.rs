//! REST API module.
//! Cached request client for the scheduling backend.

mod client;
pub mod endpoint;

pub use client::ApiClient;
pub use reqwest::Method;
