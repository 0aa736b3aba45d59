//! Authenticated user identity.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The server's projection of the authenticated principal.
///
/// The client never edits this value; it is replaced wholesale with whatever
/// the server returns after login, registration, or a profile update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_server_user() {
        let user: UserIdentity = serde_json::from_value(serde_json::json!({
            "id": 7,
            "name": "Alice",
            "email": "alice@example.com",
            "created_at": "2024-03-01T09:30:00.123456",
            "updated_at": null
        }))
        .unwrap();
        assert_eq!(user.id, 7);
        assert!(user.created_at.is_some());
        assert!(user.updated_at.is_none());
    }

    #[test]
    fn timestamps_are_optional() {
        let user: UserIdentity = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Bob", "email": "bob@example.com"
        }))
        .unwrap();
        assert!(user.created_at.is_none());
    }
}
