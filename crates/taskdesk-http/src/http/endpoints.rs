//! API endpoint paths and wire envelope types.

use std::collections::BTreeMap;

use serde::Deserialize;

use taskdesk_core::error::ApiError;
use taskdesk_core::{Error, Result, UserIdentity};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub const REGISTER: &str = "/api/auth/register";
pub const LOGIN: &str = "/api/auth/login";
pub const PROFILE: &str = "/api/auth/profile";
pub const REFRESH: &str = "/api/auth/refresh";

pub const TASKS: &str = "/api/tasks";
pub const TASK_STATUS_COUNTS: &str = "/api/tasks/status-counts";
pub const PROJECTS: &str = "/api/projects";

pub fn task(id: i64) -> String {
    format!("{}/{}", TASKS, id)
}

pub fn project(id: i64) -> String {
    format!("{}/{}", PROJECTS, id)
}

// ============================================================================
// Envelopes
// ============================================================================

/// The `{success, data, message}` wrapper every API response uses.
#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap the payload, failing if the server sent none.
    pub fn into_data(self) -> Result<T> {
        self.data.ok_or_else(|| Error::Decode {
            message: "response has no data".to_string(),
        })
    }
}

/// Payload of login and registration responses.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthPayload {
    pub user: UserIdentity,
    pub access_token: String,
    pub refresh_token: String,
}

/// Payload of the refresh response.
#[derive(Debug, Deserialize)]
pub(crate) struct RefreshPayload {
    pub access_token: String,
}

/// Error body. The JWT layer reports failures as `{"msg": ...}` rather than
/// `{"message": ...}`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Map<String, serde_json::Value>>,
}

impl ErrorBody {
    pub fn into_api_error(self, status: u16) -> ApiError {
        let errors: BTreeMap<String, String> = self
            .errors
            .unwrap_or_default()
            .into_iter()
            .map(|(field, value)| match value {
                serde_json::Value::String(s) => (field, s),
                other => (field, other.to_string()),
            })
            .collect();
        ApiError::new(status, self.message).with_errors(errors)
    }
}
