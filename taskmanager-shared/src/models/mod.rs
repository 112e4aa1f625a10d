/// Domain models for the Task Manager
///
/// - `user`: user accounts, their session tokens and avatar
/// - `task`: tasks owned by users, plus list query types
///
/// Models are plain data. Reading and writing them goes through the
/// [`crate::store`] traits.

pub mod task;
pub mod user;
