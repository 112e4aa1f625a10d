#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// - In-memory store, so no database is needed
/// - Recording mailer to observe account emails
/// - Request helpers that drive the router directly
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskmanager_api::app::{build_router, AppState};
use taskmanager_api::config::Config;
use taskmanager_shared::email::{Email, MailError, Mailer};
use taskmanager_shared::store::MemoryStore;
use tokio::sync::Mutex;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";

/// Mailer that keeps every message in memory
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<Email>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        self.sent.lock().await.push(email);
        Ok(())
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub mailer: Arc<RecordingMailer>,
    pub app: Router,
}

/// Status plus parsed JSON body (`Value::Null` when the body is empty or not JSON)
pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub json: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = Config::from_vars(|key| match key {
            "JWT_SECRET" => Some(TEST_SECRET.to_string()),
            "MAIL_FROM" => Some("noreply@example.com".to_string()),
            _ => None,
        })
        .expect("test config");

        let store = Arc::new(MemoryStore::new());
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(store.clone(), mailer.clone(), config);

        TestContext {
            store,
            mailer,
            app: build_router(state),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            bytes,
            json,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Signs a user up and returns `(user_id, token)`
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> (String, String) {
        let resp = self
            .request(
                Method::POST,
                "/users",
                None,
                Some(json!({ "name": name, "email": email, "password": password })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "signup failed: {}", resp.json);

        (
            resp.json["user"]["id"].as_str().unwrap().to_string(),
            resp.json["token"].as_str().unwrap().to_string(),
        )
    }

    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let resp = self.request(Method::POST, "/tasks", Some(token), Some(body)).await;
        assert_eq!(resp.status, StatusCode::CREATED, "task creation failed: {}", resp.json);
        resp.json
    }

    /// Posts a single multipart file under `field`
    pub async fn upload(&self, token: &str, field: &str, file_name: &str, bytes: &[u8]) -> TestResponse {
        let boundary = "----taskmanager-test-boundary";
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                field, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri("/users/me/avatar")
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", boundary),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }
}

/// Encodes a solid-color image in the given format
pub fn sample_image(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        width,
        height,
        image::Rgb([20, 120, 200]),
    ));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

/// Helper to wait for condition with timeout
pub async fn wait_for<F, Fut>(condition: F, timeout_secs: u64) -> anyhow::Result<()>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_secs(timeout_secs);

    loop {
        if condition().await {
            return Ok(());
        }

        if start.elapsed() > timeout {
            anyhow::bail!("Condition not met within {} seconds", timeout_secs);
        }

        tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
    }
}
