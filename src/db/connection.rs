//! Database connection management

use redis::aio::ConnectionManager;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::StorageConfig;

/// Create a new database connection pool
pub async fn create_pool(config: &StorageConfig) -> anyhow::Result<PgPool> {
    let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(url)
        .await?;

    Ok(pool)
}

/// Open a managed Redis connection
pub async fn create_redis(config: &StorageConfig) -> anyhow::Result<ConnectionManager> {
    let url = config
        .redis_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("REDIS_URL is not set"))?;

    let client = redis::Client::open(url)?;
    Ok(ConnectionManager::new(client).await?)
}

/// Test database connection
pub async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
