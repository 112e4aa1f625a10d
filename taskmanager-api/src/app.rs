/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskmanager_api::{app::AppState, config::Config};
/// use taskmanager_shared::email::LogMailer;
/// use taskmanager_shared::store::MemoryStore;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(Arc::new(MemoryStore::new()), Arc::new(LogMailer), config);
/// let app = taskmanager_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use taskmanager_shared::{
    auth::middleware::{require_session, SessionGate},
    email::{Mailer, Notifier},
    services::{AccountService, TaskService},
    store::Store,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub accounts: AccountService,
    pub tasks: TaskService,
    pub gate: SessionGate,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, config: Config) -> Self {
        let secret: Arc<str> = Arc::from(config.jwt.secret.as_str());
        let notifier = Notifier::new(mailer, config.mail.from.clone());

        Self {
            accounts: AccountService::new(store.clone(), notifier, secret.clone()),
            tasks: TaskService::new(store.clone()),
            gate: SessionGate::new(store.clone(), secret),
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health                     (public)
/// ├── POST /users                     (public)
/// ├── POST /users/login               (public)
/// ├── GET /users/:id/avatar           (public)
/// ├── /users/...                      (session required)
/// │   ├── POST /logout, POST /logoutAll
/// │   ├── GET | PATCH | DELETE /me
/// │   └── POST | DELETE /me/avatar
/// └── /tasks                          (session required)
///     ├── POST /, GET /
///     └── GET | PATCH | DELETE /:id
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/users", post(routes::users::signup))
        .route("/users/login", post(routes::users::login))
        .route("/users/:id/avatar", get(routes::users::get_avatar));

    let session_routes = Router::new()
        .route("/users/logout", post(routes::users::logout))
        .route("/users/logoutAll", post(routes::users::logout_all))
        .route(
            "/users/me",
            get(routes::users::me)
                .patch(routes::users::update_me)
                .delete(routes::users::delete_me),
        )
        .route(
            "/users/me/avatar",
            post(routes::users::upload_avatar).delete(routes::users::delete_avatar),
        )
        .route(
            "/tasks",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/tasks/:id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(middleware::from_fn_with_state(
            state.gate.clone(),
            require_session,
        ));

    let cors = if state.config.allows_any_origin() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
