//! # Task Manager Shared Library
//!
//! This crate contains the domain types, persistence layer and business logic
//! used by the Task Manager API server.
//!
//! ## Module Organization
//!
//! - `models`: User and Task records plus their input/patch types
//! - `auth`: Password hashing, JWT signing, sessions and the bearer gate
//! - `store`: Storage traits with PostgreSQL and in-memory implementations
//! - `db`: PostgreSQL pool and migrations
//! - `services`: Account and task operations invoked by the HTTP layer
//! - `email`: Transactional email delivery
//! - `avatar`: Profile picture normalization
//! - `error`: Service-level error taxonomy

pub mod auth;
pub mod avatar;
pub mod db;
pub mod email;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

/// Current version of the Task Manager shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
