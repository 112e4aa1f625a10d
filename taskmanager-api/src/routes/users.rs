/// User endpoints
///
/// # Endpoints
///
/// - `POST /users` - Sign up, returns `{ user, token }`
/// - `POST /users/login` - Log in, returns `{ user, token }`
/// - `POST /users/logout` - End the current session
/// - `POST /users/logoutAll` - End every session
/// - `GET /users/me` - Current profile
/// - `PATCH /users/me` - Update name, email, age or password
/// - `DELETE /users/me` - Delete the account and its tasks
/// - `POST /users/me/avatar` - Upload an avatar (multipart field `avatar`)
/// - `DELETE /users/me/avatar` - Remove the avatar
/// - `GET /users/:id/avatar` - Public PNG avatar

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
};
use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::Value;
use taskmanager_shared::{
    auth::middleware::AuthContext,
    error::ServiceError,
    models::user::{NewUser, User},
    services::{AuthResponse, Credentials},
};

/// Sign up
///
/// ```text
/// POST /users
/// Content-Type: application/json
///
/// { "name": "Jonathan", "email": "jon@example.com", "password": "MyPass777" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or email already in use
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<NewUser>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let resp = state.accounts.signup(req).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// Log in
///
/// # Errors
///
/// - `400 Bad Request`: "Unable to login" for any email/password mismatch
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<Credentials>,
) -> ApiResult<Json<AuthResponse>> {
    Ok(Json(state.accounts.login(req).await?))
}

pub async fn logout(State(state): State<AppState>, auth: AuthContext) -> ApiResult<StatusCode> {
    state.accounts.logout(&auth).await?;
    Ok(StatusCode::OK)
}

pub async fn logout_all(State(state): State<AppState>, auth: AuthContext) -> ApiResult<StatusCode> {
    state.accounts.logout_all(auth.user.id).await?;
    Ok(StatusCode::OK)
}

pub async fn me(auth: AuthContext) -> Json<User> {
    Json(auth.user)
}

/// Partial profile update
///
/// Any key other than `name`, `email`, `age` or `password` rejects the whole
/// request with 400 and changes nothing.
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthContext,
    JsonBody(patch): JsonBody<Value>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.update_profile(&auth.user, patch).await?))
}

/// Deletes the account, its tasks and its sessions; returns the removed user
pub async fn delete_me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    Ok(Json(state.accounts.delete_account(&auth.user).await?))
}

/// Avatar upload
///
/// ```text
/// POST /users/me/avatar
/// Content-Type: multipart/form-data; boundary=...
///
/// avatar=<file: .jpg, .jpeg or .png, at most 1 MB>
/// ```
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthContext,
    mut multipart: Multipart,
) -> ApiResult<StatusCode> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("avatar") {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await?;
        state
            .accounts
            .set_avatar(auth.user.id, file_name, bytes.to_vec())
            .await?;
        return Ok(StatusCode::OK);
    }

    Err(ServiceError::invalid("avatar", "Please upload an image.").into())
}

pub async fn delete_avatar(State(state): State<AppState>, auth: AuthContext) -> ApiResult<StatusCode> {
    state.accounts.clear_avatar(auth.user.id).await?;
    Ok(StatusCode::OK)
}

/// Serves a user's avatar as `image/png`; 404 when the user or avatar is missing
pub async fn get_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let png = state.accounts.avatar(&id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
