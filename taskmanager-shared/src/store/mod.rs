/// Persistence traits
///
/// The services never talk to a database directly. They are written against
/// [`UserStore`] and [`TaskStore`], which are implemented by:
///
/// - [`postgres::PgStore`]: PostgreSQL through sqlx
/// - [`memory::MemoryStore`]: process-local maps, for development and tests
///
/// Every task method takes the owner ID and filters on it, so a store can
/// never hand one user's task to another.
///
/// Session-list mutations (`push_token`, `pull_token`, `clear_tokens`) are
/// single atomic operations. Concurrent logins and logouts for the same user
/// cannot lose each other's updates.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{CreateTask, Task, TaskQuery};
use crate::models::user::{CreateUser, UpdateUser, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Another user already has this email
    #[error("Email already exists")]
    DuplicateEmail,

    /// Underlying database failure
    #[error("Store backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// User records and their session lists
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Lookup by already-normalized email
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Finds the user with this ID only if `token` is in its session list
    async fn find_user_by_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>>;

    /// Writes the `Some` fields; returns `None` if the user does not exist
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;

    /// Appends a token to the session list
    async fn push_token(&self, id: Uuid, token: &str) -> StoreResult<bool>;

    /// Removes every occurrence of a token from the session list
    async fn pull_token(&self, id: Uuid, token: &str) -> StoreResult<bool>;

    /// Empties the session list
    async fn clear_tokens(&self, id: Uuid) -> StoreResult<bool>;

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> StoreResult<bool>;

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> StoreResult<()>;
}

/// Task records, always scoped by owner
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task>;

    async fn find_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    /// Persists the mutable fields of `task`; returns `None` if it no longer exists
    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>>;

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>>;

    /// Removes every task of `owner`, returning how many were deleted
    async fn delete_tasks_by_owner(&self, owner: Uuid) -> StoreResult<u64>;
}

/// Both halves of the store, as held by the application state
pub trait Store: UserStore + TaskStore {}

impl<T: UserStore + TaskStore> Store for T {}
