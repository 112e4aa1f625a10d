/// JWT signing and validation
///
/// Session tokens are HS256-signed JWTs whose claims identify the user. The
/// signature proves integrity only: whether a token is still *live* is decided
/// by the session list stored on the user (see [`crate::auth::session`]).
///
/// # Claims
///
/// - `sub`: user ID
/// - `iss`: always "taskmanager"
/// - `iat`: issue time (Unix seconds)
/// - `jti`: random token ID, keeps tokens issued in the same second distinct
///
/// Tokens carry no `exp` claim and validation does not require one. A token
/// stays usable until it is removed from the session list.
///
/// # Example
///
/// ```
/// use taskmanager_shared::auth::jwt::{create_token, validate_token, Claims};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
/// let token = create_token(&Claims::new(user_id), "a-secret-that-is-long-enough-to-use")?;
/// let claims = validate_token(&token, "a-secret-that-is-long-enough-to-use")?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ISSUER: &str = "taskmanager";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature or payload check failed
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Invalid issuer
    #[error("Invalid issuer")]
    InvalidIssuer,
}

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "taskmanager"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Unique token ID
    pub jti: Uuid,
}

impl Claims {
    /// Creates claims for a user, stamped with the current time and a fresh token ID
    pub fn new(user_id: Uuid) -> Self {
        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: Utc::now().timestamp(),
            jti: Uuid::new_v4(),
        }
    }
}

/// Signs claims into a JWT using HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Checks a JWT's signature and issuer and returns its claims
///
/// Expiry is neither required nor checked.
///
/// # Errors
///
/// - `JwtError::InvalidIssuer` if the issuer is not "taskmanager"
/// - `JwtError::ValidationError` for a bad signature or malformed payload
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.required_spec_claims = HashSet::new();
    validation.validate_exp = false;
    validation.validate_nbf = false;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}
