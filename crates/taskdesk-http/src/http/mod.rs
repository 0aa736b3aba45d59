//! HTTP transport for the taskdesk API.
//!
//! This module provides the raw client, replayable request descriptions,
//! and the endpoint/envelope definitions.

mod client;
pub mod endpoints;
mod request;

pub use client::ApiClient;
pub use endpoints::ApiEnvelope;
pub use request::PendingRequest;
