//! taskdesk-http - Authenticated client for the taskdesk API.
//!
//! [`TaskDeskClient`] is the entry point. It owns a [`SessionStore`] holding
//! the token pair and an [`AuthPipeline`] that sends every authenticated
//! request, refreshing the access token at most once per request and at most
//! once across concurrent requests that fail together.
//!
//! ```no_run
//! use std::sync::Arc;
//! use taskdesk_http::{ClientConfig, MemoryStorage, SessionEvent, TaskDeskClient};
//!
//! # async fn example() -> Result<(), taskdesk_core::Error> {
//! let client = TaskDeskClient::new(ClientConfig::default(), Arc::new(MemoryStorage::new()))?;
//! let mut events = client.subscribe();
//!
//! let session = client.initialize().await;
//! if !session.is_authenticated() {
//!     println!("please log in");
//! }
//!
//! // Later, after any request:
//! if let Ok(SessionEvent::LoginRequired) = events.try_recv() {
//!     println!("session expired");
//! }
//! # Ok(())
//! # }
//! ```

mod client;
pub mod config;
pub mod http;
pub mod pipeline;
pub mod services;
pub mod session;
mod storage;

pub use client::TaskDeskClient;
pub use config::{API_URL_ENV, ClientConfig};
pub use http::{ApiClient, ApiEnvelope, PendingRequest};
pub use pipeline::AuthPipeline;
pub use services::{Dashboard, DashboardSummary, Projects, Tasks};
pub use session::{Session, SessionEvent, SessionStore};
pub use storage::MemoryStorage;
