//! Session repository (Redis)
//!
//! `session:{digest}` holds the JSON record with a TTL equal to the remaining
//! lifetime, so expired sessions disappear on their own. Revocation deletes the
//! key; the token can never validate again because digests are never reissued.
//! `user_sessions:{user_id}` indexes a user's digests for bulk revocation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::{
    constants::redis_keys,
    db::store::SessionStore,
    error::{AppError, AppResult},
    models::SessionRecord,
};

/// Redis-backed session store
#[derive(Clone)]
pub struct SessionRepository {
    redis: ConnectionManager,
}

impl SessionRepository {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn session_key(digest: &str) -> String {
        format!("{}:{}", redis_keys::SESSION_PREFIX, digest)
    }

    fn user_key(user_id: &Uuid) -> String {
        format!("{}:{}", redis_keys::USER_SESSIONS_PREFIX, user_id)
    }

    fn decode(raw: &str) -> AppResult<SessionRecord> {
        serde_json::from_str(raw)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Corrupt session record: {}", e)))
    }
}

#[async_trait]
impl SessionStore for SessionRepository {
    async fn insert(&self, digest: &str, record: SessionRecord) -> AppResult<()> {
        let mut redis = self.redis.clone();
        let ttl = (record.expires_at - Utc::now()).num_seconds().max(1);
        let payload = serde_json::to_string(&record)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Session encoding failed: {}", e)))?;

        let created: Option<String> = redis::cmd("SET")
            .arg(Self::session_key(digest))
            .arg(payload)
            .arg("NX")
            .arg("EX")
            .arg(ttl)
            .query_async(&mut redis)
            .await?;

        if created.is_none() {
            return Err(AppError::Conflict("Session token collision".to_string()));
        }

        let user_key = Self::user_key(&record.user_id);
        redis.sadd::<_, _, ()>(&user_key, digest).await?;
        // The index lives as long as the newest session
        redis.expire::<_, ()>(&user_key, ttl).await?;

        Ok(())
    }

    async fn get(&self, digest: &str) -> AppResult<Option<SessionRecord>> {
        let mut redis = self.redis.clone();
        let raw: Option<String> = redis.get(Self::session_key(digest)).await?;
        raw.as_deref().map(Self::decode).transpose()
    }

    async fn revoke(&self, digest: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let Some(record) = self.get(digest).await? else {
            return Ok(false);
        };

        let mut redis = self.redis.clone();
        let removed: i64 = redis.del(Self::session_key(digest)).await?;
        redis
            .srem::<_, _, ()>(Self::user_key(&record.user_id), digest)
            .await?;

        Ok(removed > 0 && record.is_active(at))
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &Uuid,
        keep: Option<&str>,
        _at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut redis = self.redis.clone();
        let user_key = Self::user_key(user_id);
        let digests: Vec<String> = redis.smembers(&user_key).await?;

        let mut revoked = 0;
        for digest in digests.iter().filter(|d| keep != Some(d.as_str())) {
            let removed: i64 = redis.del(Self::session_key(digest)).await?;
            redis.srem::<_, _, ()>(&user_key, digest).await?;
            revoked += removed as u64;
        }

        Ok(revoked)
    }

    async fn purge_invalid(&self, _now: DateTime<Utc>) -> AppResult<u64> {
        // Key TTLs already evict expired sessions and revocation deletes keys
        Ok(0)
    }
}
