//! Login, registration and profile update payloads.

use std::fmt;

use serde::Serialize;

use crate::Result;
use crate::validation;

/// Login credentials.
///
/// # Security
///
/// The password is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use taskdesk_core::Credentials;
///
/// let creds = Credentials::new("alice@example.com", "Secret123");
/// assert_eq!(creds.email(), "alice@example.com");
/// ```
#[derive(Clone, Serialize)]
pub struct Credentials {
    email: String,
    password: String,
}

impl Credentials {
    /// Create new credentials.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Check that both fields are filled in and the email is well formed.
    pub fn validate(&self) -> Result<()> {
        validation::validate_email(&self.email)?;
        validation::require("password", &self.password)?;
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account registration payload.
#[derive(Clone, Serialize)]
pub struct Registration {
    name: String,
    email: String,
    password: String,
}

impl Registration {
    /// Create a registration request.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Returns the display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Apply the same rules the server enforces on new accounts.
    pub fn validate(&self) -> Result<()> {
        validation::require("name", &self.name)?;
        validation::validate_email(&self.email)?;
        validation::validate_password(&self.password)?;
        Ok(())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Profile edit payload. Absent fields are left unchanged by the server.
#[derive(Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    password: Option<String>,
}

impl ProfileUpdate {
    /// An empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a new display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set a new email address.
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Set a new password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none()
    }

    /// Validate only the fields being changed.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            validation::require("name", name)?;
        }
        if let Some(ref email) = self.email {
            validation::validate_email(email)?;
        }
        if let Some(ref password) = self.password {
            validation::validate_password(password)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProfileUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProfileUpdate")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_password_in_debug() {
        let creds = Credentials::new("alice@example.com", "secret123");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("alice@example.com"));
        assert!(!debug.contains("secret123"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn credentials_serialize_as_login_body() {
        let creds = Credentials::new("a@b.com", "x");
        assert_eq!(
            serde_json::to_value(&creds).unwrap(),
            serde_json::json!({"email": "a@b.com", "password": "x"})
        );
    }

    #[test]
    fn profile_update_omits_unset_fields() {
        let update = ProfileUpdate::new().name("New");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({"name": "New"})
        );
        assert!(!format!("{:?}", ProfileUpdate::new().password("Hunter22")).contains("Hunter22"));
    }

    #[test]
    fn registration_rejects_weak_password() {
        let reg = Registration::new("Alice", "alice@example.com", "short");
        assert!(reg.validate().is_err());
        let reg = Registration::new("Alice", "alice@example.com", "Longenough1");
        assert!(reg.validate().is_ok());
    }
}
