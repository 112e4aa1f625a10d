/// Session lifecycle through the account service, against the in-memory store

use std::sync::Arc;

use taskmanager_shared::auth::middleware::SessionGate;
use taskmanager_shared::email::{LogMailer, Notifier};
use taskmanager_shared::error::ServiceError;
use taskmanager_shared::models::user::NewUser;
use taskmanager_shared::services::{AccountService, Credentials};
use taskmanager_shared::store::{MemoryStore, UserStore};

const SECRET: &str = "integration-secret-at-least-32-characters";

struct Harness {
    store: Arc<MemoryStore>,
    accounts: AccountService,
    gate: SessionGate,
}

fn harness() -> Harness {
    let store = Arc::new(MemoryStore::new());
    let notifier = Notifier::new(Arc::new(LogMailer), "noreply@example.com");
    Harness {
        accounts: AccountService::new(store.clone(), notifier, SECRET),
        gate: SessionGate::new(store.clone(), SECRET),
        store,
    }
}

fn mike() -> NewUser {
    NewUser {
        name: "Mike".to_string(),
        age: 0,
        email: "mike@example.com".to_string(),
        password: "56what!!".to_string(),
    }
}

fn credentials() -> Credentials {
    Credentials {
        email: "mike@example.com".to_string(),
        password: "56what!!".to_string(),
    }
}

fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

#[tokio::test]
async fn test_password_is_never_stored_in_plaintext() {
    let h = harness();
    let resp = h.accounts.signup(mike()).await.unwrap();

    let stored = h.store.find_user(resp.user.id).await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "56what!!");
    assert!(stored.password_hash.starts_with("$argon2id$"));
}

#[tokio::test]
async fn test_two_logins_append_two_distinct_tokens() {
    let h = harness();
    let signup = h.accounts.signup(mike()).await.unwrap();

    let first = h.accounts.login(credentials()).await.unwrap();
    let second = h.accounts.login(credentials()).await.unwrap();
    assert_ne!(first.token, second.token);

    let stored = h.store.find_user(signup.user.id).await.unwrap().unwrap();
    assert_eq!(stored.tokens.len(), 3);
    assert_eq!(stored.tokens.last(), Some(&second.token));
}

#[tokio::test]
async fn test_logout_removes_only_that_token() {
    let h = harness();
    h.accounts.signup(mike()).await.unwrap();
    let a = h.accounts.login(credentials()).await.unwrap();
    let b = h.accounts.login(credentials()).await.unwrap();

    let ctx = h.gate.authenticate(Some(&bearer(&a.token))).await.unwrap();
    h.accounts.logout(&ctx).await.unwrap();

    assert!(h.gate.authenticate(Some(&bearer(&a.token))).await.is_err());
    assert!(h.gate.authenticate(Some(&bearer(&b.token))).await.is_ok());
}

#[tokio::test]
async fn test_logout_all_invalidates_every_token() {
    let h = harness();
    let signup = h.accounts.signup(mike()).await.unwrap();
    let login = h.accounts.login(credentials()).await.unwrap();

    h.accounts.logout_all(signup.user.id).await.unwrap();

    let stored = h.store.find_user(signup.user.id).await.unwrap().unwrap();
    assert!(stored.tokens.is_empty());
    assert!(h.gate.authenticate(Some(&bearer(&signup.token))).await.is_err());
    assert!(h.gate.authenticate(Some(&bearer(&login.token))).await.is_err());
}

#[tokio::test]
async fn test_wrong_password_issues_no_token() {
    let h = harness();
    let signup = h.accounts.signup(mike()).await.unwrap();

    let result = h
        .accounts
        .login(Credentials {
            email: "mike@example.com".to_string(),
            password: "thisisnotmypass".to_string(),
        })
        .await;
    assert!(matches!(result, Err(ServiceError::InvalidCredentials)));

    let stored = h.store.find_user(signup.user.id).await.unwrap().unwrap();
    assert_eq!(stored.tokens, vec![signup.token]);
}

#[tokio::test]
async fn test_concurrent_logins_keep_every_token() {
    let h = harness();
    let signup = h.accounts.signup(mike()).await.unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let accounts = h.accounts.clone();
            tokio::spawn(async move { accounts.login(credentials()).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = h.store.find_user(signup.user.id).await.unwrap().unwrap();
    assert_eq!(stored.tokens.len(), 5);
}
