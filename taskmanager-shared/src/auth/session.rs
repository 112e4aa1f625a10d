/// Session lifecycle
///
/// A session is a signed token that also appears in its user's token list.
/// Both halves must hold for the session to be live:
///
/// ```text
/// issue:  sign(Claims{sub: user}) -> push onto user.tokens
/// verify: check signature -> find user by (sub, token ∈ tokens)
/// revoke: pull one token, or clear all of them
/// ```
///
/// Revocation is immediate. Once a token leaves the list, the next request
/// carrying it fails verification even though its signature is still valid.

use tracing::debug;
use uuid::Uuid;

use super::jwt::{create_token, validate_token, Claims, JwtError};
use crate::models::user::User;
use crate::store::{StoreError, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Signing failed
    #[error("Could not sign token: {0}")]
    Token(JwtError),

    /// Bad signature, wrong issuer or malformed token
    #[error("Invalid token: {0}")]
    InvalidToken(JwtError),

    /// Signature is fine but the token is not in the user's list
    #[error("Session revoked or user deleted")]
    Revoked,
}

/// Signs a new token for `user_id` and records it as live
pub async fn issue<S: UserStore + ?Sized>(
    store: &S,
    secret: &str,
    user_id: Uuid,
) -> Result<String, SessionError> {
    let token = create_token(&Claims::new(user_id), secret).map_err(SessionError::Token)?;

    if !store.push_token(user_id, &token).await? {
        return Err(SessionError::Revoked);
    }

    debug!(user_id = %user_id, "Session issued");
    Ok(token)
}

/// Resolves a bearer token to its live user
pub async fn verify<S: UserStore + ?Sized>(
    store: &S,
    secret: &str,
    token: &str,
) -> Result<User, SessionError> {
    let claims = validate_token(token, secret).map_err(SessionError::InvalidToken)?;

    store
        .find_user_by_token(claims.sub, token)
        .await?
        .ok_or(SessionError::Revoked)
}

/// Ends one session; other sessions of the user stay live
pub async fn revoke_one<S: UserStore + ?Sized>(
    store: &S,
    user_id: Uuid,
    token: &str,
) -> Result<(), SessionError> {
    store.pull_token(user_id, token).await?;
    debug!(user_id = %user_id, "Session revoked");
    Ok(())
}

/// Ends every session of the user
pub async fn revoke_all<S: UserStore + ?Sized>(store: &S, user_id: Uuid) -> Result<(), SessionError> {
    store.clear_tokens(user_id).await?;
    debug!(user_id = %user_id, "All sessions revoked");
    Ok(())
}
