/// Account and task operations
///
/// The HTTP handlers are thin: they extract the caller and the payload and
/// call into these services, which own validation, ownership scoping and the
/// order of side effects.
///
/// - `accounts`: signup, login, sessions, profile, avatar
/// - `tasks`: owner-scoped task CRUD and listing

pub mod accounts;
pub mod tasks;

use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{FieldError, ServiceError, ServiceResult};

pub use accounts::{AccountService, AuthResponse, Credentials};
pub use tasks::TaskService;

/// Parses a path id; anything that is not a UUID cannot name a resource
pub(crate) fn parse_id(raw: &str) -> ServiceResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ServiceError::NotFound)
}

/// Fails unless `patch` is an object whose keys are all in `allowed`
pub(crate) fn check_allowed_keys(patch: &Value, allowed: &[&str]) -> ServiceResult<()> {
    let object = patch
        .as_object()
        .ok_or_else(|| ServiceError::invalid("body", "Expected a JSON object"))?;

    let rejected: Vec<FieldError> = object
        .keys()
        .filter(|key| !allowed.contains(&key.as_str()))
        .map(|key| FieldError::new(key.as_str(), "Invalid updates!"))
        .collect();

    if rejected.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(rejected))
    }
}

/// Fails if any key is set to `null`
///
/// Serde reads `null` into an `Option` field as "absent", which would turn
/// `{"name": null}` into a silent no-op. No updatable field is nullable.
pub(crate) fn reject_nulls(patch: &Value) -> ServiceResult<()> {
    let nulls: Vec<FieldError> = patch
        .as_object()
        .into_iter()
        .flatten()
        .filter(|(_, value)| value.is_null())
        .map(|(key, _)| FieldError::new(key.as_str(), "Value cannot be null"))
        .collect();

    if nulls.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::Validation(nulls))
    }
}

/// Deserializes an already key-checked patch; type mismatches become validation errors
pub(crate) fn decode_patch<T: DeserializeOwned>(patch: Value) -> ServiceResult<T> {
    serde_json::from_value(patch).map_err(|e| ServiceError::invalid("body", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
        assert!(matches!(parse_id("12345"), Err(ServiceError::NotFound)));
    }

    #[test]
    fn test_check_allowed_keys() {
        let allowed = &["name", "age"];
        assert!(check_allowed_keys(&json!({ "name": "x" }), allowed).is_ok());
        assert!(check_allowed_keys(&json!({}), allowed).is_ok());

        match check_allowed_keys(&json!({ "name": "x", "location": "Austin" }), allowed) {
            Err(ServiceError::Validation(details)) => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "location");
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        assert!(check_allowed_keys(&json!([1, 2]), allowed).is_err());
    }

    #[test]
    fn test_reject_nulls() {
        assert!(reject_nulls(&json!({ "name": "x", "age": 0 })).is_ok());
        assert!(reject_nulls(&json!({})).is_ok());

        match reject_nulls(&json!({ "name": null, "age": 3, "email": null })) {
            Err(ServiceError::Validation(details)) => {
                let mut fields: Vec<_> = details.iter().map(|d| d.field.as_str()).collect();
                fields.sort();
                assert_eq!(fields, vec!["email", "name"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
