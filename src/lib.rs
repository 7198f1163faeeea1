//! accountd - User Account Management Service
//!
//! This library provides the account and session core behind a small REST
//! API: registration, login, password reset and change, profile edits,
//! soft deletion and logout.
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers and the response envelope (thin layer)
//! - **Middleware**: Bearer token authentication, request logging
//! - **Services**: Account lifecycle, password hashing, session tokens
//! - **Stores**: Credential and session persistence (in-memory or Postgres/Redis)
//! - **Models**: Domain models

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
