/// Bearer-token gate for Axum
///
/// [`require_session`] reads `Authorization: Bearer <token>`, resolves it
/// through [`crate::auth::session::verify`] and inserts an [`AuthContext`]
/// into the request extensions. Every failure is answered with the same 401
/// body so a caller learns nothing about why the token was refused.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{middleware, routing::get, Router};
/// use taskmanager_shared::auth::middleware::{require_session, AuthContext, SessionGate};
/// use taskmanager_shared::store::MemoryStore;
///
/// async fn me(auth: AuthContext) -> String {
///     auth.user.name
/// }
///
/// let gate = SessionGate::new(Arc::new(MemoryStore::new()), "a-secret-that-is-long-enough-to-use");
/// let app: Router = Router::new()
///     .route("/users/me", get(me))
///     .route_layer(middleware::from_fn_with_state(gate, require_session));
/// ```

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{debug, error};

use super::session::{verify, SessionError};
use crate::models::user::User;
use crate::store::Store;

/// Message returned for every rejected request
pub const AUTHENTICATION_MESSAGE: &str = "Please authenticate";

/// Authenticated caller, available to handlers behind the gate
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: User,

    /// Raw bearer token, needed to end this one session
    pub token: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing credentials")]
    MissingCredentials,

    #[error("Expected Bearer token")]
    InvalidFormat,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Store failure during authentication: {0}")]
    Store(String),
}

impl From<SessionError> for AuthError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Store(e) => AuthError::Store(e.to_string()),
            other => AuthError::InvalidToken(other.to_string()),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match &self {
            AuthError::Store(msg) => error!(error = %msg, "Authentication aborted by store error"),
            other => debug!(reason = %other, "Request rejected by session gate"),
        }

        let body = Json(json!({
            "error": "unauthorized",
            "message": AUTHENTICATION_MESSAGE,
        }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// State for [`require_session`]
#[derive(Clone)]
pub struct SessionGate {
    store: Arc<dyn Store>,
    secret: Arc<str>,
}

impl SessionGate {
    pub fn new(store: Arc<dyn Store>, secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            secret: secret.into(),
        }
    }

    /// Resolves an `Authorization` header value to its caller
    pub async fn authenticate(&self, header_value: Option<&str>) -> Result<AuthContext, AuthError> {
        let token = header_value
            .ok_or(AuthError::MissingCredentials)?
            .strip_prefix("Bearer ")
            .ok_or(AuthError::InvalidFormat)?
            .trim();

        let user = verify(self.store.as_ref(), &self.secret, token).await?;

        Ok(AuthContext {
            user,
            token: token.to_string(),
        })
    }
}

/// Axum middleware; use with `middleware::from_fn_with_state`
pub async fn require_session(
    State(gate): State<SessionGate>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let context = gate.authenticate(header_value).await?;
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthContext {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingCredentials)
    }
}
