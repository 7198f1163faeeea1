//! Session token service
//!
//! Tokens are opaque random strings handed to the client once. The store only
//! ever sees their SHA-256 digest, so a leaked session table cannot be
//! replayed.

use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{Duration, Utc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    constants::SESSION_TOKEN_LENGTH,
    db::SessionStore,
    error::{AppError, AppResult},
    models::{IssuedToken, SessionRecord},
    utils::{generate_secure_token, hash_string},
};

/// Attempts before giving up on a digest collision
const ISSUE_ATTEMPTS: usize = 3;

/// Issues, validates and revokes bearer session tokens
#[derive(Clone)]
pub struct TokenService {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl TokenService {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Mint a fresh token bound to `user_id`
    pub async fn issue(&self, user_id: Uuid) -> AppResult<IssuedToken> {
        for _ in 0..ISSUE_ATTEMPTS {
            let token = generate_secure_token(SESSION_TOKEN_LENGTH);
            let issued_at = Utc::now();
            let expires_at = issued_at + self.ttl;
            let record = SessionRecord::new(user_id, issued_at, expires_at);

            match self.store.insert(&hash_string(&token), record).await {
                Ok(()) => {
                    debug!(user_id = %user_id, expires_at = %expires_at, "Session issued");
                    return Ok(IssuedToken { token, expires_at });
                }
                Err(AppError::Conflict(_)) => {
                    warn!(user_id = %user_id, "Session token collision, regenerating");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::Internal(anyhow::anyhow!(
            "Could not mint a unique session token"
        )))
    }

    /// Resolve a token to its user, or `InvalidToken`
    pub async fn validate(&self, token: &str) -> AppResult<Uuid> {
        if token.is_empty() {
            return Err(AppError::InvalidToken);
        }

        let record = self
            .store
            .get(&hash_string(token))
            .await?
            .ok_or(AppError::InvalidToken)?;

        if record.is_active(Utc::now()) {
            Ok(record.user_id)
        } else {
            Err(AppError::InvalidToken)
        }
    }

    /// Permanently invalidate one token; unknown or already revoked tokens are fine
    pub async fn revoke(&self, token: &str) -> AppResult<()> {
        let revoked = self.store.revoke(&hash_string(token), Utc::now()).await?;
        debug!(revoked, "Session revoke requested");
        Ok(())
    }

    /// Invalidate every session of a user, optionally sparing the one presenting `keep`
    pub async fn revoke_all(&self, user_id: &Uuid, keep: Option<&str>) -> AppResult<u64> {
        let keep_digest = keep.map(hash_string);
        let revoked = self
            .store
            .revoke_all_for_user(user_id, keep_digest.as_deref(), Utc::now())
            .await?;

        info!(user_id = %user_id, revoked, "Revoked user sessions");
        Ok(revoked)
    }

    /// Remove records that can no longer validate
    pub async fn sweep(&self) -> AppResult<u64> {
        self.store.purge_invalid(Utc::now()).await
    }

    /// Run `sweep` on a fixed interval until the runtime shuts down
    pub fn spawn_sweeper(&self, every: StdDuration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            // The first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match service.sweep().await {
                    Ok(0) => {}
                    Ok(purged) => debug!(purged, "Purged invalid sessions"),
                    Err(e) => warn!(error = %e, "Session sweep failed"),
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemorySessionStore;

    fn service_with(store: Arc<MemorySessionStore>, ttl: Duration) -> TokenService {
        TokenService::new(store, ttl)
    }

    #[tokio::test]
    async fn test_issue_then_validate() {
        let tokens = service_with(Arc::new(MemorySessionStore::new()), Duration::hours(1));
        let user_id = Uuid::new_v4();

        let issued = tokens.issue(user_id).await.unwrap();
        assert_eq!(issued.token.len(), SESSION_TOKEN_LENGTH);
        assert_eq!(tokens.validate(&issued.token).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_tokens_are_never_reused() {
        let tokens = service_with(Arc::new(MemorySessionStore::new()), Duration::hours(1));
        let user_id = Uuid::new_v4();

        let first = tokens.issue(user_id).await.unwrap();
        let second = tokens.issue(user_id).await.unwrap();
        let other = tokens.issue(Uuid::new_v4()).await.unwrap();

        assert_ne!(first.token, second.token);
        assert_ne!(first.token, other.token);
    }

    #[tokio::test]
    async fn test_revoke_is_permanent_and_idempotent() {
        let tokens = service_with(Arc::new(MemorySessionStore::new()), Duration::hours(1));
        let issued = tokens.issue(Uuid::new_v4()).await.unwrap();

        tokens.revoke(&issued.token).await.unwrap();
        tokens.revoke(&issued.token).await.unwrap();

        assert!(matches!(
            tokens.validate(&issued.token).await,
            Err(AppError::InvalidToken)
        ));
        // Sweeping the revoked record does not bring it back either
        tokens.sweep().await.unwrap();
        assert!(matches!(
            tokens.validate(&issued.token).await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_expired_token_is_invalid() {
        let tokens = service_with(Arc::new(MemorySessionStore::new()), Duration::seconds(-1));
        let issued = tokens.issue(Uuid::new_v4()).await.unwrap();

        assert!(matches!(
            tokens.validate(&issued.token).await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_unknown_and_empty_tokens() {
        let tokens = service_with(Arc::new(MemorySessionStore::new()), Duration::hours(1));
        assert!(matches!(tokens.validate("").await, Err(AppError::InvalidToken)));
        assert!(matches!(
            tokens.validate("nonexistent").await,
            Err(AppError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_revoke_all_spares_kept_session() {
        let tokens = service_with(Arc::new(MemorySessionStore::new()), Duration::hours(1));
        let user_id = Uuid::new_v4();
        let a = tokens.issue(user_id).await.unwrap();
        let b = tokens.issue(user_id).await.unwrap();
        let stranger = tokens.issue(Uuid::new_v4()).await.unwrap();

        assert_eq!(tokens.revoke_all(&user_id, Some(&b.token)).await.unwrap(), 1);
        assert!(tokens.validate(&a.token).await.is_err());
        assert!(tokens.validate(&b.token).await.is_ok());
        assert!(tokens.validate(&stranger.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweep_only_removes_invalid_records() {
        let store = Arc::new(MemorySessionStore::new());
        let tokens = service_with(store.clone(), Duration::hours(1));
        let live = tokens.issue(Uuid::new_v4()).await.unwrap();
        let dead = tokens.issue(Uuid::new_v4()).await.unwrap();
        tokens.revoke(&dead.token).await.unwrap();

        assert_eq!(tokens.sweep().await.unwrap(), 1);
        assert_eq!(store.len().await, 1);
        assert!(tokens.validate(&live.token).await.is_ok());
    }

    #[tokio::test]
    async fn test_sweeper_runs_in_background() {
        let store = Arc::new(MemorySessionStore::new());
        let tokens = service_with(store.clone(), Duration::hours(1));
        let live = tokens.issue(Uuid::new_v4()).await.unwrap();
        let dead = tokens.issue(Uuid::new_v4()).await.unwrap();
        tokens.revoke(&dead.token).await.unwrap();

        let handle = tokens.spawn_sweeper(StdDuration::from_millis(10));
        tokio::time::sleep(StdDuration::from_millis(200)).await;
        handle.abort();

        assert_eq!(store.len().await, 1);
        assert!(tokens.validate(&live.token).await.is_ok());
    }
}
