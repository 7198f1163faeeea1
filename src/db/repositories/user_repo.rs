//! User repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    constants::constraints,
    db::store::UserStore,
    error::{AppError, AppResult},
    models::{NewUser, ProfileUpdate, User},
};

/// Postgres-backed credential store
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Map unique index violations onto the duplicate-identifier errors
    fn map_insert_error(err: sqlx::Error) -> AppError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                match db_err.constraint() {
                    Some(constraints::USERS_EMAIL_KEY) => return AppError::DuplicateEmail,
                    Some(constraints::USERS_USER_NAME_KEY) => return AppError::DuplicateUsername,
                    _ => {}
                }
            }
        }
        AppError::from(err)
    }

    /// Fail with NotFound when an UPDATE touched no active row
    fn expect_one(rows_affected: u64) -> AppResult<()> {
        if rows_affected == 0 {
            Err(AppError::NotFound("User not found".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        let user = User::new(new_user);

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (
                id, first_name, last_name, user_name, email, password_hash,
                telephone, country, is_admin, email_verified,
                validation_token_hash, validation_token_expires_at,
                created_on, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.user_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.telephone)
        .bind(&user.country)
        .bind(user.is_admin)
        .bind(user.email_verified)
        .bind(&user.validation_token_hash)
        .bind(user.validation_token_expires_at)
        .bind(user.created_on)
        .bind(user.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(Self::map_insert_error)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE lower(email) = lower($1) AND deleted_at IS NULL"#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            r#"SELECT * FROM users WHERE deleted_at IS NULL ORDER BY created_on ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn update_profile(&self, id: &Uuid, update: &ProfileUpdate) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                telephone = COALESCE($4, telephone),
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&update.first_name)
        .bind(&update.last_name)
        .bind(&update.telephone)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    async fn set_password(&self, id: &Uuid, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        Self::expect_one(result.rows_affected())
    }

    async fn set_validation_token(
        &self,
        id: &Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET validation_token_hash = $2, validation_token_expires_at = $3, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(digest)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Self::expect_one(result.rows_affected())
    }

    async fn consume_validation_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        // Single statement so two concurrent consumers cannot both succeed
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET validation_token_hash = NULL, validation_token_expires_at = NULL, updated_at = $2
            WHERE validation_token_hash = $1
                AND validation_token_expires_at > $2
                AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(digest)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn mark_email_verified(&self, id: &Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET email_verified = true,
                validation_token_hash = NULL,
                validation_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Self::expect_one(result.rows_affected())
    }

    async fn soft_delete(&self, id: &Uuid) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET deleted_at = NOW(),
                validation_token_hash = NULL,
                validation_token_expires_at = NULL,
                updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Self::expect_one(result.rows_affected())
    }
}
