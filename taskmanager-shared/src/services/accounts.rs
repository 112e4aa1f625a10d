/// Account service
///
/// # Flows
///
/// ```text
/// signup:  normalize/check -> hash -> create -> welcome email -> issue token
/// login:   lookup by email -> verify hash -> issue token
/// update:  allow-list -> decode -> normalize/check -> hash if changed -> write
/// delete:  delete tasks -> delete user -> cancellation email
/// ```
///
/// Password hashing and avatar resizing run on the blocking pool.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::{check_allowed_keys, decode_patch, parse_id, reject_nulls};
use crate::auth::middleware::AuthContext;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::session;
use crate::avatar::normalize_avatar;
use crate::email::Notifier;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::{
    normalize_email, CreateUser, NewUser, UpdateUser, User, UserPatch, USER_UPDATABLE_FIELDS,
};
use crate::store::Store;

/// Login payload
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Body returned by signup and login
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: String,
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn Store>,
    notifier: Notifier,
    secret: Arc<str>,
}

async fn hash_blocking(password: String) -> ServiceResult<String> {
    Ok(tokio::task::spawn_blocking(move || hash_password(&password)).await??)
}

impl AccountService {
    pub fn new(store: Arc<dyn Store>, notifier: Notifier, secret: impl Into<Arc<str>>) -> Self {
        Self {
            store,
            notifier,
            secret: secret.into(),
        }
    }

    pub async fn signup(&self, input: NewUser) -> ServiceResult<AuthResponse> {
        let input = input.normalized();
        input.check()?;

        let password_hash = hash_blocking(input.password).await?;
        let user = self
            .store
            .create_user(CreateUser {
                name: input.name,
                age: input.age,
                email: input.email,
                password_hash,
            })
            .await?;

        self.notifier.send_welcome(&user.email, &user.name);

        let token = session::issue(self.store.as_ref(), &self.secret, user.id).await?;
        info!(user_id = %user.id, "User signed up");

        Ok(AuthResponse { user, token })
    }

    pub async fn login(&self, credentials: Credentials) -> ServiceResult<AuthResponse> {
        let email = normalize_email(&credentials.email);
        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let password = credentials.password.trim().to_string();
        let hash = user.password_hash.clone();
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await??;
        if !matches {
            debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        let token = session::issue(self.store.as_ref(), &self.secret, user.id).await?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResponse { user, token })
    }

    /// Ends the session the request was made with
    pub async fn logout(&self, auth: &AuthContext) -> ServiceResult<()> {
        session::revoke_one(self.store.as_ref(), auth.user.id, &auth.token).await?;
        Ok(())
    }

    pub async fn logout_all(&self, user_id: Uuid) -> ServiceResult<()> {
        session::revoke_all(self.store.as_ref(), user_id).await?;
        Ok(())
    }

    /// Applies a raw JSON patch to the caller's profile
    ///
    /// Keys outside [`USER_UPDATABLE_FIELDS`] fail the whole update before
    /// anything is written.
    pub async fn update_profile(&self, user: &User, patch: Value) -> ServiceResult<User> {
        check_allowed_keys(&patch, USER_UPDATABLE_FIELDS)?;
        reject_nulls(&patch)?;
        let patch: UserPatch = decode_patch(patch)?;
        let patch = patch.normalized();
        patch.check()?;

        let password_hash = match patch.password {
            Some(password) => Some(hash_blocking(password).await?),
            None => None,
        };

        let update = UpdateUser {
            name: patch.name,
            age: patch.age,
            email: patch.email,
            password_hash,
        };
        if update.is_empty() {
            return Ok(user.clone());
        }

        let updated = self
            .store
            .update_user(user.id, update)
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(user_id = %user.id, "Profile updated");
        Ok(updated)
    }

    /// Removes the caller's tasks, then the caller
    ///
    /// Both stores also drop a user's tasks on `delete_user` and refuse new
    /// tasks for a missing owner, so a task created in between cannot survive.
    pub async fn delete_account(&self, user: &User) -> ServiceResult<User> {
        let removed_tasks = self.store.delete_tasks_by_owner(user.id).await?;
        if !self.store.delete_user(user.id).await? {
            return Err(ServiceError::NotFound);
        }

        self.notifier.send_cancellation(&user.email, &user.name);
        info!(user_id = %user.id, removed_tasks, "Account deleted");

        Ok(user.clone())
    }

    pub async fn set_avatar(&self, user_id: Uuid, file_name: String, bytes: Vec<u8>) -> ServiceResult<()> {
        let png = tokio::task::spawn_blocking(move || normalize_avatar(&file_name, &bytes)).await??;

        if !self.store.set_avatar(user_id, Some(png)).await? {
            return Err(ServiceError::NotFound);
        }
        debug!(user_id = %user_id, "Avatar stored");
        Ok(())
    }

    pub async fn clear_avatar(&self, user_id: Uuid) -> ServiceResult<()> {
        if !self.store.set_avatar(user_id, None).await? {
            return Err(ServiceError::NotFound);
        }
        Ok(())
    }

    /// PNG bytes of a user's avatar; public
    pub async fn avatar(&self, raw_id: &str) -> ServiceResult<Vec<u8>> {
        let id = parse_id(raw_id)?;
        self.store
            .find_user(id)
            .await?
            .and_then(|user| user.avatar)
            .ok_or(ServiceError::NotFound)
    }
}
