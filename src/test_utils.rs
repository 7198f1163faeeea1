//! Test utilities with lazy testcontainers support
//!
//! Containers are started on first use and shared by every test in the
//! binary. Only the connection URL is handed out, so later tests never touch
//! the Docker client owned by the runtime that started the container.
//! Tests built on these helpers need a Docker daemon and are `#[ignore]`d;
//! run them with `cargo test -- --ignored`.

use redis::aio::ConnectionManager;
use sqlx::PgPool;
use testcontainers::{runners::AsyncRunner, ContainerAsync};
use testcontainers_modules::{postgres::Postgres, redis::Redis};
use tokio::sync::OnceCell;

use crate::db;

static POSTGRES: OnceCell<(ContainerAsync<Postgres>, String)> = OnceCell::const_new();
static REDIS: OnceCell<(ContainerAsync<Redis>, String)> = OnceCell::const_new();

/// Get or start a PostgreSQL container and return its URL
pub async fn postgres_url() -> &'static str {
    let (_, url) = POSTGRES
        .get_or_init(|| async {
            let container = Postgres::default()
                .with_user("accountd")
                .with_password("accountd_test")
                .with_db_name("accountd_test")
                .start()
                .await
                .expect("Failed to start PostgreSQL container");

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();
            let url = format!(
                "postgres://accountd:accountd_test@{}:{}/accountd_test",
                host, port
            );
            (container, url)
        })
        .await;
    url
}

/// Get or start a Redis container and return its URL
pub async fn redis_url() -> &'static str {
    let (_, url) = REDIS
        .get_or_init(|| async {
            let container = Redis::default()
                .start()
                .await
                .expect("Failed to start Redis container");

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(6379).await.unwrap();
            (container, format!("redis://{}:{}", host, port))
        })
        .await;
    url
}

/// Fresh pool on the shared database with migrations applied
pub async fn pg_pool() -> PgPool {
    let pool = PgPool::connect(postgres_url().await)
        .await
        .expect("Failed to connect to test database");

    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

/// Fresh managed connection to the shared Redis
pub async fn redis_connection() -> ConnectionManager {
    let client = redis::Client::open(redis_url().await).expect("Invalid Redis URL");
    ConnectionManager::new(client)
        .await
        .expect("Failed to connect to test Redis")
}
