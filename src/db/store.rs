//! Storage seams
//!
//! Services talk to these traits; the concrete backend (in-memory or
//! Postgres/Redis) is chosen once at startup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{NewUser, ProfileUpdate, SessionRecord, User},
};

/// Credential store
///
/// Lookups never return soft-deleted users. Uniqueness checks on insert do
/// consider them, so a deleted account's email and user name stay reserved.
/// Every method is atomic with respect to a single user record.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user, failing with `DuplicateEmail` or `DuplicateUsername`
    async fn insert(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<User>>;

    /// `email` must already be normalized
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// All active users, oldest first
    async fn list(&self) -> AppResult<Vec<User>>;

    async fn update_profile(&self, id: &Uuid, update: &ProfileUpdate) -> AppResult<User>;

    async fn set_password(&self, id: &Uuid, password_hash: &str) -> AppResult<()>;

    /// Replace any outstanding validation token
    async fn set_validation_token(
        &self,
        id: &Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()>;

    /// Compare-and-clear: returns the owner only if `digest` is outstanding and
    /// unexpired, and clears it in the same step.
    async fn consume_validation_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>>;

    /// Set `email_verified` and drop any outstanding validation token
    async fn mark_email_verified(&self, id: &Uuid) -> AppResult<()>;

    async fn soft_delete(&self, id: &Uuid) -> AppResult<()>;
}

/// Session store, keyed by the SHA-256 digest of the bearer token
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Fails with `Conflict` if the digest is already known
    async fn insert(&self, digest: &str, record: SessionRecord) -> AppResult<()>;

    async fn get(&self, digest: &str) -> AppResult<Option<SessionRecord>>;

    /// Idempotent; returns whether an active session was revoked by this call
    async fn revoke(&self, digest: &str, at: DateTime<Utc>) -> AppResult<bool>;

    /// Revoke every session of `user_id` except `keep`; returns how many were revoked
    async fn revoke_all_for_user(
        &self,
        user_id: &Uuid,
        keep: Option<&str>,
        at: DateTime<Utc>,
    ) -> AppResult<u64>;

    /// Drop revoked and expired records; active ones are never touched
    async fn purge_invalid(&self, now: DateTime<Utc>) -> AppResult<u64>;
}
