//! User account model.

use chrono::{DateTime, Utc};
use serde::Serialize;

use meridian_core::{Email, UserId};

/// A storefront user.
///
/// Created on first successful OTP verification; `name` and `last_login`
/// are refreshed on every subsequent login.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier.
    pub id: UserId,
    /// Normalized email address; the identity key.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Most recent successful login.
    pub last_login: DateTime<Utc>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last modified.
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_camel_case() {
        let user = User {
            id: UserId::generate(),
            email: Email::parse("user@example.com").unwrap(),
            name: "Test User".to_string(),
            last_login: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("lastLogin").is_some());
        assert!(json.get("createdAt").is_some());
        assert_eq!(json["email"], "user@example.com");
    }
}
