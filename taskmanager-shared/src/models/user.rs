/// User model and its inputs
///
/// A user owns a list of live session tokens and, optionally, an avatar. The
/// password hash, the token list and the avatar bytes are never serialized:
/// the `Serialize` impl skips them, so any `Json<User>` response is safe to
/// send as-is.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY,
///     name TEXT NOT NULL,
///     age INTEGER NOT NULL DEFAULT 0 CHECK (age >= 0),
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     tokens TEXT[] NOT NULL DEFAULT '{}',
///     avatar BYTEA,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::password::validate_password_rules;
use crate::error::{ServiceError, ServiceResult};

/// Fields a user may change through a profile update
pub const USER_UPDATABLE_FIELDS: &[&str] = &["name", "email", "age", "password"];

/// User account
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Age in years
    pub age: i32,

    /// Email address, stored trimmed and lowercased
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Live session tokens, oldest first
    #[serde(skip_serializing)]
    pub tokens: Vec<String>,

    /// PNG avatar
    #[serde(skip_serializing)]
    pub avatar: Option<Vec<u8>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Whether `token` is one of this user's live sessions
    pub fn holds_token(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }
}

/// Signup payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewUser {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: String,

    #[serde(default)]
    #[validate(range(min = 0, message = "Age must be a positive number."))]
    pub age: i32,

    #[validate(email(message = "Email is invalid. Please enter a valid email."))]
    pub email: String,

    #[validate(length(min = 7, message = "Password must be at least 7 characters long."))]
    pub password: String,
}

impl NewUser {
    /// Trims every field and lowercases the email
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            age: self.age,
            email: normalize_email(&self.email),
            password: self.password.trim().to_string(),
        }
    }

    /// Runs declarative and explicit checks on an already normalized payload
    pub fn check(&self) -> ServiceResult<()> {
        self.validate()?;
        validate_password_rules(&self.password)
            .map_err(|msg| ServiceError::invalid("password", msg))
    }
}

/// Profile update payload
///
/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UserPatch {
    #[validate(length(min = 1, message = "Name is required."))]
    pub name: Option<String>,

    #[validate(range(min = 0, message = "Age must be a positive number."))]
    pub age: Option<i32>,

    #[validate(email(message = "Email is invalid. Please enter a valid email."))]
    pub email: Option<String>,

    #[validate(length(min = 7, message = "Password must be at least 7 characters long."))]
    pub password: Option<String>,
}

impl UserPatch {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.map(|n| n.trim().to_string()),
            age: self.age,
            email: self.email.as_deref().map(normalize_email),
            password: self.password.map(|p| p.trim().to_string()),
        }
    }

    pub fn check(&self) -> ServiceResult<()> {
        self.validate()?;
        if let Some(password) = &self.password {
            validate_password_rules(password)
                .map_err(|msg| ServiceError::invalid("password", msg))?;
        }
        Ok(())
    }
}

/// Store input for a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub age: i32,
    pub email: String,
    pub password_hash: String,
}

/// Store input for a profile update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
    }
}

/// Canonical form used for storage and lookups
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Mike".to_string(),
            age: 0,
            email: "mike@example.com".to_string(),
            password_hash: "$argon2id$hash".to_string(),
            tokens: vec!["token-a".to_string()],
            avatar: Some(vec![1, 2, 3]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_serialization_hides_secrets() {
        let value = serde_json::to_value(sample_user()).unwrap();
        let object = value.as_object().unwrap();

        assert!(object.contains_key("name"));
        assert!(object.contains_key("email"));
        assert!(!object.contains_key("password_hash"));
        assert!(!object.contains_key("password"));
        assert!(!object.contains_key("tokens"));
        assert!(!object.contains_key("avatar"));
    }

    #[test]
    fn test_holds_token() {
        let user = sample_user();
        assert!(user.holds_token("token-a"));
        assert!(!user.holds_token("token-b"));
    }

    #[test]
    fn test_new_user_normalization() {
        let input: NewUser = serde_json::from_value(json!({
            "name": "  Jonathan ",
            "email": " Jonathan@Example.COM ",
            "password": " MyPass777 "
        }))
        .unwrap();

        let user = input.normalized();
        assert_eq!(user.name, "Jonathan");
        assert_eq!(user.email, "jonathan@example.com");
        assert_eq!(user.password, "MyPass777");
        assert_eq!(user.age, 0);
        assert!(user.check().is_ok());
    }

    #[test]
    fn test_new_user_rejections() {
        let base = NewUser {
            name: "Jonathan".to_string(),
            age: 0,
            email: "jonathan@example.com".to_string(),
            password: "MyPass777".to_string(),
        };

        let bad_email = NewUser { email: "not-an-email".to_string(), ..base.clone() };
        let negative_age = NewUser { age: -1, ..base.clone() };
        let blank_name = NewUser { name: "   ".to_string(), ..base.clone() }.normalized();
        let short_password = NewUser { password: "abc".to_string(), ..base.clone() };
        let forbidden_word = NewUser { password: "myPassword1".to_string(), ..base };

        for input in [bad_email, negative_age, blank_name, short_password, forbidden_word] {
            assert!(
                matches!(input.check(), Err(ServiceError::Validation(_))),
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_patch_rejects_unknown_fields() {
        let result: Result<UserPatch, _> = serde_json::from_value(json!({ "location": "Austin" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_patch_checks_only_supplied_fields() {
        let patch: UserPatch = serde_json::from_value(json!({ "name": "MikeG" })).unwrap();
        assert!(patch.normalized().check().is_ok());

        let patch: UserPatch = serde_json::from_value(json!({ "password": "password99" })).unwrap();
        assert!(patch.normalized().check().is_err());
    }

    #[test]
    fn test_allow_list_is_exact() {
        assert_eq!(USER_UPDATABLE_FIELDS, &["name", "email", "age", "password"]);
        assert!(!USER_UPDATABLE_FIELDS.contains(&"tokens"));
    }

    #[test]
    fn test_update_user_is_empty() {
        assert!(UpdateUser::default().is_empty());
        assert!(!UpdateUser { age: Some(3), ..Default::default() }.is_empty());
    }
}
