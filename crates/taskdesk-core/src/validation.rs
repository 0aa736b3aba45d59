//! Client-side field validation.
//!
//! These mirror the server's rules so obviously bad input is rejected
//! before a request is issued.

use crate::Result;
use crate::error::InvalidInputError;

/// Longest accepted task title or project name, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Shortest accepted password, in characters.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Reject empty (or whitespace only) required fields.
pub fn require(field: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InvalidInputError::Field {
            field,
            reason: format!("{} is required", field),
        }
        .into());
    }
    Ok(())
}

/// Validate a required name-like field (task title, project name).
pub fn validate_name(field: &'static str, value: &str) -> Result<()> {
    require(field, value)?;
    if value.chars().count() > MAX_NAME_LEN {
        return Err(InvalidInputError::Field {
            field,
            reason: format!("{} must be less than {} characters", field, MAX_NAME_LEN),
        }
        .into());
    }
    Ok(())
}

/// Validate an email address.
///
/// `localhost` and dotted IPv4 domains are accepted as-is; any other domain
/// needs at least two labels and an alphabetic top-level label.
pub fn validate_email(email: &str) -> Result<()> {
    let fail = |reason: &str| -> crate::Error {
        InvalidInputError::Email {
            value: email.to_string(),
            reason: reason.to_string(),
        }
        .into()
    };

    let (local, domain) = email
        .rsplit_once('@')
        .ok_or_else(|| fail("must contain an @-sign"))?;

    if local.is_empty() {
        return Err(fail("there must be something before the @-sign"));
    }
    if local.chars().any(char::is_whitespace) || local.contains('@') {
        return Err(fail("invalid characters before the @-sign"));
    }

    if domain == "localhost" || is_ipv4(domain) {
        return Ok(());
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return Err(fail("the domain name is not valid"));
    }
    for label in &labels {
        let valid = !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(fail("the domain name is not valid"));
        }
    }

    let tld = labels[labels.len() - 1];
    if tld.len() < 2 || !tld.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(fail("the domain name is not valid"));
    }

    Ok(())
}

fn is_ipv4(domain: &str) -> bool {
    let parts: Vec<&str> = domain.split('.').collect();
    parts.len() == 4
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// Validate password strength: minimum length, a digit, and an uppercase letter.
pub fn validate_password(password: &str) -> Result<()> {
    let reason = if password.chars().count() < MIN_PASSWORD_LEN {
        Some(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        ))
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Some("Password must contain at least one digit".to_string())
    } else if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Some("Password must contain at least one uppercase letter".to_string())
    } else {
        None
    };

    match reason {
        Some(reason) => Err(InvalidInputError::Password { reason }.into()),
        None => Ok(()),
    }
}
