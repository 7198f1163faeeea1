//! Database module
//!
//! This module handles storage backends: connections, migrations, the store
//! traits and their in-memory and Postgres/Redis implementations.

pub mod connection;
pub mod memory;
pub mod repositories;
pub mod store;

use sqlx::PgPool;

pub use connection::*;
pub use memory::{MemorySessionStore, MemoryUserStore};
pub use store::{SessionStore, UserStore};

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
