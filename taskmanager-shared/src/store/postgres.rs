/// PostgreSQL store
///
/// Session-list changes are single `UPDATE` statements on the `tokens` array
/// column (`array_append`, `array_remove`, `'{}'`), so concurrent logins and
/// logouts never overwrite each other. Task statements always carry
/// `owner = $n` in their `WHERE` clause.
///
/// # Example
///
/// ```no_run
/// use taskmanager_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskmanager_shared::store::{PgStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// }).await?;
/// let store = PgStore::new(pool);
/// store.ping().await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::task::{CreateTask, Task, TaskQuery};
use crate::models::user::{CreateUser, UpdateUser, User};

const USER_COLUMNS: &str =
    "id, name, age, email, password_hash, tokens, avatar, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, name, description, notes, priority, completed, owner, created_at, updated_at";

/// Unique constraint on `users.email`
const EMAIL_CONSTRAINT: &str = "users_email_key";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.constraint() == Some(EMAIL_CONSTRAINT) {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Backend(err.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, name, age, email, password_hash)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.age)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND $2 = ANY(tokens)"
        ))
        .bind(id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.age.is_some() {
            bind_count += 1;
            query.push_str(&format!(", age = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);
        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(age) = data.age {
            q = q.bind(age);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        Ok(q.fetch_optional(&self.pool).await?)
    }

    async fn push_token(&self, id: Uuid, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET tokens = array_append(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET tokens = array_remove(tokens, $2) WHERE id = $1")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear_tokens(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE users SET tokens = '{}' WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> StoreResult<bool> {
        let result =
            sqlx::query("UPDATE users SET avatar = $2, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .bind(avatar)
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (id, owner, name, description, notes, priority, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(data.owner)
        .bind(data.name)
        .bind(data.description)
        .bind(data.notes)
        .bind(data.priority)
        .bind(data.completed)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        // The sort column comes from a closed enum, never from the request text.
        let order_by = match query.sort {
            Some(sort) => format!(
                "{} {}, created_at ASC, id ASC",
                sort.key.column(),
                sort.direction.as_sql()
            ),
            None => "created_at ASC, id ASC".to_string(),
        };

        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE owner = $1 AND ($2::BOOLEAN IS NULL OR completed = $2)
            ORDER BY {order_by}
            LIMIT $3 OFFSET $4
            "#
        );

        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner)
            .bind(query.completed)
            .bind(query.limit)
            .bind(query.skip.unwrap_or(0))
            .fetch_all(&self.pool)
            .await?;

        Ok(tasks)
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let saved = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET name = $3, description = $4, notes = $5, priority = $6, completed = $7,
                updated_at = NOW()
            WHERE id = $1 AND owner = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(task.id)
        .bind(task.owner)
        .bind(&task.name)
        .bind(&task.description)
        .bind(&task.notes)
        .bind(&task.priority)
        .bind(task.completed)
        .fetch_optional(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "DELETE FROM tasks WHERE id = $1 AND owner = $2 RETURNING {TASK_COLUMNS}"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn delete_tasks_by_owner(&self, owner: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
