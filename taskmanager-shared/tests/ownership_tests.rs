/// Task ownership across two users, against the in-memory store

use std::sync::Arc;

use serde_json::json;
use taskmanager_shared::email::{LogMailer, Notifier};
use taskmanager_shared::error::ServiceError;
use taskmanager_shared::models::task::{ListTasksParams, NewTask};
use taskmanager_shared::models::user::{NewUser, User};
use taskmanager_shared::services::{AccountService, TaskService};
use taskmanager_shared::store::MemoryStore;

const SECRET: &str = "integration-secret-at-least-32-characters";

struct Harness {
    store: Arc<MemoryStore>,
    accounts: AccountService,
    tasks: TaskService,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(Arc::new(LogMailer), "noreply@example.com");
    Harness {
        accounts: AccountService::new(store.clone(), notifier, SECRET),
        tasks: TaskService::new(store.clone()),
        store,
    }
}

async fn signup(h: &Harness, name: &str) -> User {
    h.accounts
        .signup(NewUser {
            name: name.to_string(),
            age: 0,
            email: format!("{}@example.com", name.to_lowercase()),
            password: "MyPass777".to_string(),
        })
        .await
        .unwrap()
        .user
}

fn new_task(name: &str) -> NewTask {
    serde_json::from_value(json!({ "name": name, "description": "Update navbar" })).unwrap()
}

#[tokio::test]
async fn test_other_user_cannot_touch_task() {
    let h = harness();
    let alice = signup(&h, "Alice").await;
    let bob = signup(&h, "Bob").await;

    let task = h.tasks.create(alice.id, new_task("Kobe")).await.unwrap();
    let id = task.id.to_string();

    assert!(matches!(h.tasks.get(bob.id, &id).await, Err(ServiceError::NotFound)));
    assert!(matches!(
        h.tasks.update(bob.id, &id, json!({ "completed": true })).await,
        Err(ServiceError::NotFound)
    ));
    assert!(matches!(h.tasks.delete(bob.id, &id).await, Err(ServiceError::NotFound)));
    assert!(h
        .tasks
        .list(bob.id, ListTasksParams::default())
        .await
        .unwrap()
        .is_empty());

    let unchanged = h.tasks.get(alice.id, &id).await.unwrap();
    assert_eq!(unchanged, task);
}

#[tokio::test]
async fn test_deleting_user_removes_only_their_tasks() {
    let h = harness();
    let alice = signup(&h, "Alice").await;
    let bob = signup(&h, "Bob").await;

    h.tasks.create(alice.id, new_task("a1")).await.unwrap();
    h.tasks.create(alice.id, new_task("a2")).await.unwrap();
    let bobs = h.tasks.create(bob.id, new_task("b1")).await.unwrap();

    let removed = h.accounts.delete_account(&alice).await.unwrap();
    assert_eq!(removed.id, alice.id);

    assert_eq!(h.store.task_count().await, 1);
    assert!(h.tasks.get(bob.id, &bobs.id.to_string()).await.is_ok());
}

#[tokio::test]
async fn test_state_machine_round_trip() {
    let h = harness();
    let alice = signup(&h, "Alice").await;
    let task = h.tasks.create(alice.id, new_task("Kobe")).await.unwrap();
    let id = task.id.to_string();

    let done = h.tasks.update(alice.id, &id, json!({ "completed": true })).await.unwrap();
    assert!(done.completed);

    let active = h.tasks.update(alice.id, &id, json!({ "completed": false })).await.unwrap();
    assert!(!active.completed);

    h.tasks.delete(alice.id, &id).await.unwrap();
    assert!(matches!(h.tasks.get(alice.id, &id).await, Err(ServiceError::NotFound)));
}

#[tokio::test]
async fn test_long_description_leaves_task_unchanged() {
    let h = harness();
    let alice = signup(&h, "Alice").await;
    let task = h.tasks.create(alice.id, new_task("Kobe")).await.unwrap();
    let id = task.id.to_string();

    let result = h
        .tasks
        .update(alice.id, &id, json!({ "description": "d".repeat(55) }))
        .await;
    assert!(matches!(result, Err(ServiceError::Validation(_))));
    assert_eq!(h.tasks.get(alice.id, &id).await.unwrap().description, "Update navbar");
}
