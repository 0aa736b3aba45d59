//! Error types for the taskdesk client.
//!
//! This module provides a unified error type with explicit variants for
//! transport, authentication, API, storage, and input validation errors.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The unified error type for taskdesk operations.
///
/// Only the [`Error::Auth`] variants correspond to conditions that tear down
/// the session; everything else is handed back to the caller untouched.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Irrecoverable authentication errors.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Error responses from the API, including `401` authentication failures.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Input validation errors raised before a request is issued.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),

    /// Durable token storage errors.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A successful response whose body could not be decoded.
    #[error("malformed response: {message}")]
    Decode { message: String },

    /// A request body or header that could not be encoded.
    #[error("could not encode request: {message}")]
    Encode { message: String },
}

impl Error {
    /// Returns true if this error is an authentication failure response
    /// that the request pipeline may recover from by refreshing.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Api(err) if err.is_auth_failure())
    }

    /// Returns the server supplied message when there is one, otherwise
    /// `fallback`.
    ///
    /// ```
    /// use taskdesk_core::error::{ApiError, Error};
    ///
    /// let err = Error::from(ApiError::new(409, Some("User already exists".into())));
    /// assert_eq!(err.user_message("Registration failed"), "User already exists");
    ///
    /// let err = Error::Decode { message: "eof".into() };
    /// assert_eq!(err.user_message("Registration failed"), "Registration failed");
    /// ```
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Error::Api(ApiError {
                message: Some(message),
                ..
            }) => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out")]
    Timeout,

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication errors that end the session.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The operation needs an authenticated session.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A refresh was requested but no refresh token is held.
    #[error("no refresh token available")]
    NoRefreshToken,

    /// The refresh endpoint rejected the refresh token or could not be reached.
    #[error("token refresh failed: {source}")]
    RefreshFailed {
        #[source]
        source: Box<Error>,
    },
}

/// An error response from the API.
///
/// The API answers failures with `{"success": false, "message": ..., "errors": ...}`.
/// Field level validation messages, when present, land in `errors`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the server.
    pub message: Option<String>,
    /// Field level validation messages.
    pub errors: BTreeMap<String, String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        for (field, message) in &self.errors {
            write!(f, " [{}: {}]", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self {
            status,
            message,
            errors: BTreeMap::new(),
        }
    }

    /// Attach field level validation messages.
    pub fn with_errors(mut self, errors: BTreeMap<String, String>) -> Self {
        self.errors = errors;
        self
    }

    /// Check if this is an authentication failure.
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401
    }
}

/// Input validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid email address.
    #[error("invalid email '{value}': {reason}")]
    Email { value: String, reason: String },

    /// Password does not meet the strength rules.
    #[error("invalid password: {reason}")]
    Password { reason: String },

    /// A named field failed validation.
    #[error("invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },

    /// Unknown enumeration value.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant { kind: &'static str, value: String },
}

/// Durable token storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Filesystem error.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored data could not be parsed.
    #[error("corrupt token store {path}: {message}")]
    Corrupt { path: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_401_is_auth_failure() {
        assert!(Error::from(ApiError::new(401, None)).is_auth_failure());
        assert!(!Error::from(ApiError::new(403, None)).is_auth_failure());
        assert!(!Error::from(ApiError::new(422, None)).is_auth_failure());
        assert!(
            !Error::from(TransportError::Connection {
                message: "refused".into()
            })
            .is_auth_failure()
        );
    }

    #[test]
    fn api_error_display_includes_field_errors() {
        let mut errors = BTreeMap::new();
        errors.insert("email".to_string(), "bad domain".to_string());
        let err = ApiError::new(400, Some("Invalid email".into())).with_errors(errors);
        assert_eq!(err.to_string(), "HTTP 400: Invalid email [email: bad domain]");
    }

    #[test]
    fn refresh_failed_keeps_source() {
        let err = Error::from(AuthError::RefreshFailed {
            source: Box::new(ApiError::new(401, Some("Token has expired".into())).into()),
        });
        assert!(err.to_string().contains("Token has expired"));
        assert!(!err.is_auth_failure());
    }
}
