//! Durable token storage trait.

use async_trait::async_trait;

use crate::Result;

/// Storage key for the persisted access token.
pub const ACCESS_TOKEN_KEY: &str = "token";

/// Storage key for the persisted refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// A durable string key-value store for session tokens.
///
/// Implementations must treat a missing key as `Ok(None)` and removing a
/// missing key as success.
#[async_trait]
pub trait TokenStorage: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove the value stored under `key`.
    async fn remove(&self, key: &str) -> Result<()>;
}
