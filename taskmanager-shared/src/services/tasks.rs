/// Task service
///
/// Every operation takes the caller's user ID and passes it down to the
/// store, so a task that belongs to someone else is indistinguishable from a
/// task that does not exist.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::{check_allowed_keys, decode_patch, parse_id, reject_nulls};
use crate::error::{ServiceError, ServiceResult};
use crate::models::task::{
    CreateTask, ListTasksParams, NewTask, Task, TaskPatch, TaskQuery, TASK_UPDATABLE_FIELDS,
};
use crate::store::Store;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, owner: Uuid, input: NewTask) -> ServiceResult<Task> {
        let input = input.normalized();
        input.validate()?;

        let task = self.store.insert_task(CreateTask::from_new(owner, input)).await?;
        info!(task_id = %task.id, owner = %owner, "Task created");
        Ok(task)
    }

    pub async fn get(&self, owner: Uuid, raw_id: &str) -> ServiceResult<Task> {
        let id = parse_id(raw_id)?;
        self.store
            .find_task(owner, id)
            .await?
            .ok_or(ServiceError::NotFound)
    }

    pub async fn list(&self, owner: Uuid, params: ListTasksParams) -> ServiceResult<Vec<Task>> {
        let query = TaskQuery::try_from(params)?;
        let tasks = self.store.list_tasks(owner, &query).await?;
        debug!(owner = %owner, count = tasks.len(), "Tasks listed");
        Ok(tasks)
    }

    /// Applies a raw JSON patch; nothing is written unless every field is valid
    pub async fn update(&self, owner: Uuid, raw_id: &str, patch: Value) -> ServiceResult<Task> {
        let mut task = self.get(owner, raw_id).await?;

        check_allowed_keys(&patch, TASK_UPDATABLE_FIELDS)?;
        reject_nulls(&patch)?;
        let patch: TaskPatch = decode_patch(patch)?;
        let patch = patch.normalized();
        patch.validate()?;

        patch.apply_to(&mut task);
        let saved = self
            .store
            .save_task(&task)
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(task_id = %saved.id, status = ?saved.status(), "Task updated");
        Ok(saved)
    }

    pub async fn delete(&self, owner: Uuid, raw_id: &str) -> ServiceResult<Task> {
        let id = parse_id(raw_id)?;
        let task = self
            .store
            .delete_task(owner, id)
            .await?
            .ok_or(ServiceError::NotFound)?;

        info!(task_id = %task.id, owner = %owner, "Task deleted");
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::CreateUser;
    use crate::store::{MemoryStore, UserStore};
    use serde_json::json;

    fn new_task(name: &str) -> NewTask {
        serde_json::from_value(json!({ "name": name, "description": "Update navbar" })).unwrap()
    }

    fn service() -> (TaskService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (TaskService::new(store.clone()), store)
    }

    async fn user(store: &MemoryStore) -> Uuid {
        store
            .create_user(CreateUser {
                name: "Mike".to_string(),
                age: 0,
                email: format!("{}@example.com", Uuid::new_v4()),
                password_hash: "hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_create_forces_owner() {
        let (tasks, store) = service();
        let owner = user(&store).await;

        let task = tasks.create(owner, new_task("Kobe")).await.unwrap();
        assert_eq!(task.owner, owner);
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let (tasks, store) = service();
        let owner = user(&store).await;
        let result = tasks.create(owner, new_task("   ")).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
    }

    #[tokio::test]
    async fn test_update_is_atomic() {
        let (tasks, store) = service();
        let owner = user(&store).await;
        let task = tasks.create(owner, new_task("Kobe")).await.unwrap();
        let id = task.id.to_string();

        let result = tasks
            .update(owner, &id, json!({ "name": "Bryant", "description": "x".repeat(55) }))
            .await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(tasks.get(owner, &id).await.unwrap(), task);

        let result = tasks.update(owner, &id, json!({ "completed": "yes" })).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));

        let result = tasks.update(owner, &id, json!({ "owner": Uuid::new_v4() })).await;
        assert!(matches!(result, Err(ServiceError::Validation(_))));
        assert_eq!(tasks.get(owner, &id).await.unwrap().owner, owner);
    }

    #[tokio::test]
    async fn test_update_rejects_null_values() {
        let (tasks, store) = service();
        let owner = user(&store).await;
        let task = tasks.create(owner, new_task("Kobe")).await.unwrap();
        let id = task.id.to_string();

        for patch in [
            json!({ "name": null, "description": null }),
            json!({ "name": "Bryant", "completed": null }),
            json!({ "notes": null }),
        ] {
            match tasks.update(owner, &id, patch.clone()).await {
                Err(ServiceError::Validation(details)) => {
                    assert!(details.iter().all(|d| d.message == "Value cannot be null"));
                }
                other => panic!("{} should fail validation, got {:?}", patch, other),
            }
        }
        assert_eq!(tasks.get(owner, &id).await.unwrap(), task);
    }

    #[tokio::test]
    async fn test_foreign_task_is_not_found_before_validation() {
        let (tasks, store) = service();
        let (alice, bob) = (user(&store).await, user(&store).await);
        let task = tasks.create(alice, new_task("Kobe")).await.unwrap();

        let result = tasks
            .update(bob, &task.id.to_string(), json!({ "location": "Austin" }))
            .await;
        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let (tasks, _) = service();
        let owner = Uuid::new_v4();

        assert!(matches!(tasks.get(owner, "abc").await, Err(ServiceError::NotFound)));
        assert!(matches!(tasks.delete(owner, "abc").await, Err(ServiceError::NotFound)));
    }
}
