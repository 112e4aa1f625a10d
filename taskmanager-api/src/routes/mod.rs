/// API route handlers
///
/// Handlers extract the caller and payload, call into the shared services and
/// shape the response. Business rules live in `taskmanager_shared::services`.
///
/// - `health`: Health check endpoint
/// - `users`: signup, login, sessions, profile, avatar
/// - `tasks`: task CRUD for the authenticated user

pub mod health;
pub mod tasks;
pub mod users;
