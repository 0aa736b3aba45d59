//! Client configuration.

use std::time::Duration;

use taskdesk_core::{ApiUrl, Result};

/// Environment variable that overrides the API base URL.
pub const API_URL_ENV: &str = "TASKDESK_API_URL";

/// Settings for the HTTP transport.
///
/// Requests carry no deadline unless `timeout` is set.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: ApiUrl,
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            ..Self::default()
        }
    }

    /// Build a configuration from the environment, falling back to the
    /// local development server.
    pub fn from_env() -> Result<Self> {
        match std::env::var(API_URL_ENV) {
            Ok(url) if !url.trim().is_empty() => Ok(Self::new(ApiUrl::new(url.trim())?)),
            _ => Ok(Self::default()),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: ApiUrl::default(),
            user_agent: concat!("taskdesk/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_targets_local_server_without_timeout() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url.as_str(), "http://localhost:5000/");
        assert!(config.timeout.is_none());
        assert!(config.user_agent.starts_with("taskdesk/"));
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::new(ApiUrl::new("https://tasks.example.com").unwrap())
            .with_timeout(Duration::from_secs(5))
            .with_user_agent("test-agent");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.base_url.host(), Some("tasks.example.com"));
    }
}
