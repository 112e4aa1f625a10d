/// Service-level error taxonomy
///
/// Every account and task operation returns [`ServiceError`]. The HTTP layer
/// maps each variant onto exactly one status class:
///
/// | Variant              | Status |
/// |----------------------|--------|
/// | `Validation`         | 400    |
/// | `InvalidCredentials` | 400    |
/// | `Authentication`     | 401    |
/// | `NotFound`           | 404    |
/// | `Unexpected`         | 500    |
///
/// Ownership mismatches are reported as `NotFound` so that callers cannot
/// probe for the existence of other users' resources.

use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordError;
use crate::auth::session::SessionError;
use crate::avatar::AvatarError;
use crate::store::StoreError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type shared by all services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Input failed shape or content checks
    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldError>),

    /// Email/password pair did not match a user
    #[error("Unable to login")]
    InvalidCredentials,

    /// Missing, invalid or revoked token
    #[error("Please authenticate")]
    Authentication,

    /// Resource absent or not owned by the caller
    #[error("Resource not found")]
    NotFound,

    /// Downstream or store failure
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl ServiceError {
    /// Shorthand for a validation error on a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldError {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));
        ServiceError::Validation(details)
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ServiceError::invalid("email", "Email is already in use"),
            other => ServiceError::Unexpected(other.to_string()),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Unexpected(format!("Password operation failed: {}", err))
    }
}

impl From<SessionError> for ServiceError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Store(e) => e.into(),
            SessionError::Token(e) => ServiceError::Unexpected(format!("Token error: {}", e)),
            SessionError::InvalidToken(_) | SessionError::Revoked => ServiceError::Authentication,
        }
    }
}

impl From<AvatarError> for ServiceError {
    fn from(err: AvatarError) -> Self {
        match err {
            AvatarError::Encode(msg) => ServiceError::Unexpected(format!("Avatar encoding failed: {}", msg)),
            other => ServiceError::invalid("avatar", other.to_string()),
        }
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Unexpected(format!("Background work failed: {}", err))
    }
}
