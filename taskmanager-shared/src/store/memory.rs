/// In-memory store
///
/// Keeps users and tasks in `tokio::sync::RwLock`-guarded maps. Each trait
/// method holds the write lock for its whole read-modify-write, which gives
/// the same per-record atomicity as the PostgreSQL store. Tasks follow the
/// same owner rules as the `tasks.owner` foreign key: inserting for an unknown
/// owner fails and removing a user removes their tasks. Locks are always taken
/// users first, then tasks. Data is lost when the process exits.
///
/// # Example
///
/// ```
/// use taskmanager_shared::store::{MemoryStore, UserStore};
/// use taskmanager_shared::models::user::CreateUser;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// let user = store.create_user(CreateUser {
///     name: "Mike".to_string(),
///     age: 0,
///     email: "mike@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
/// assert!(store.find_user(user.id).await?.is_some());
/// # Ok(())
/// # }
/// ```

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{StoreError, StoreResult, TaskStore, UserStore};
use crate::models::task::{CreateTask, SortDirection, Task, TaskQuery, TaskSortKey};
use crate::models::user::{CreateUser, UpdateUser, User};

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks across all owners
    pub async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &data.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            age: data.age,
            email: data.email,
            password_hash: data.password_hash,
            tokens: Vec::new(),
            avatar: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .get(&id)
            .filter(|u| u.holds_token(token))
            .cloned())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        if let Some(email) = &data.email {
            if email_taken(&users, email, Some(id)) {
                return Err(StoreError::DuplicateEmail);
            }
        }

        let Some(user) = users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = data.name {
            user.name = name;
        }
        if let Some(age) = data.age {
            user.age = age;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        if let Some(password_hash) = data.password_hash {
            user.password_hash = password_hash;
        }
        user.updated_at = Utc::now();
        Ok(Some(user.clone()))
    }

    async fn push_token(&self, id: Uuid, token: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.tokens.push(token.to_string());
                true
            }
            None => false,
        })
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.tokens.retain(|t| t != token);
                true
            }
            None => false,
        })
    }

    async fn clear_tokens(&self, id: Uuid) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.tokens.clear();
                true
            }
            None => false,
        })
    }

    async fn set_avatar(&self, id: Uuid, avatar: Option<Vec<u8>>) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&id) {
            Some(user) => {
                user.avatar = avatar;
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut users = self.users.write().await;
        if users.remove(&id).is_none() {
            return Ok(false);
        }
        self.tasks.write().await.retain(|_, t| t.owner != id);
        Ok(true)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, data: CreateTask) -> StoreResult<Task> {
        // Users lock held across the insert
        let users = self.users.read().await;
        if !users.contains_key(&data.owner) {
            return Err(StoreError::Backend(format!(
                "Task owner {} does not exist",
                data.owner
            )));
        }

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            notes: data.notes,
            priority: data.priority,
            completed: data.completed,
            owner: data.owner,
            created_at: now,
            updated_at: now,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self
            .tasks
            .read()
            .await
            .get(&id)
            .filter(|t| t.owner == owner)
            .cloned())
    }

    async fn list_tasks(&self, owner: Uuid, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let mut tasks: Vec<Task> = self
            .tasks
            .read()
            .await
            .values()
            .filter(|t| t.owner == owner)
            .filter(|t| query.completed.map_or(true, |c| t.completed == c))
            .cloned()
            .collect();

        // Creation order first so ties under the requested key stay stable.
        tasks.sort_by(|a, b| {
            TaskSortKey::CreatedAt
                .compare(a, b)
                .then_with(|| a.id.cmp(&b.id))
        });
        if let Some(sort) = query.sort {
            tasks.sort_by(|a, b| {
                let ordering = sort.key.compare(a, b);
                match sort.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        let skip = query.skip.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(tasks.into_iter().skip(skip).take(limit).collect())
    }

    async fn save_task(&self, task: &Task) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        let Some(stored) = tasks.get_mut(&task.id).filter(|t| t.owner == task.owner) else {
            return Ok(None);
        };
        stored.name = task.name.clone();
        stored.description = task.description.clone();
        stored.notes = task.notes.clone();
        stored.priority = task.priority.clone();
        stored.completed = task.completed;
        stored.updated_at = Utc::now();
        Ok(Some(stored.clone()))
    }

    async fn delete_task(&self, owner: Uuid, id: Uuid) -> StoreResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;
        if tasks.get(&id).is_some_and(|t| t.owner == owner) {
            Ok(tasks.remove(&id))
        } else {
            Ok(None)
        }
    }

    async fn delete_tasks_by_owner(&self, owner: Uuid) -> StoreResult<u64> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, t| t.owner != owner);
        Ok((before - tasks.len()) as u64)
    }
}
