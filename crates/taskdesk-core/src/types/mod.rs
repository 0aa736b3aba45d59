//! Core API types.
//!
//! These types enforce their invariants at construction time.

mod api_url;
mod user;

pub use api_url::{ApiUrl, DEFAULT_API_URL};
pub use user::UserIdentity;
