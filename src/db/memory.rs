//! In-memory stores
//!
//! Used for local development and tests. A single `RwLock` per store gives
//! concurrent reads and makes each write atomic.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::store::{SessionStore, UserStore},
    error::{AppError, AppResult},
    models::{NewUser, ProfileUpdate, SessionRecord, User},
};

fn user_not_found() -> AppError {
    AppError::NotFound("User not found".to_string())
}

/// Process-local credential store
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Mutable access to an active (not soft-deleted) user
fn active_mut<'a>(users: &'a mut HashMap<Uuid, User>, id: &Uuid) -> AppResult<&'a mut User> {
    users
        .get_mut(id)
        .filter(|u| !u.is_deleted())
        .ok_or_else(user_not_found)
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email.eq_ignore_ascii_case(&new_user.email)) {
            return Err(AppError::DuplicateEmail);
        }
        if users
            .values()
            .any(|u| u.user_name.to_lowercase() == new_user.user_name.to_lowercase())
        {
            return Err(AppError::DuplicateUsername);
        }

        let user = User::new(new_user);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &Uuid) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(id).filter(|u| !u.is_deleted()).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| !u.is_deleted() && u.email == email)
            .cloned())
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let users = self.users.read().await;
        let mut active: Vec<User> = users.values().filter(|u| !u.is_deleted()).cloned().collect();
        active.sort_by_key(|u| u.created_on);
        Ok(active)
    }

    async fn update_profile(&self, id: &Uuid, update: &ProfileUpdate) -> AppResult<User> {
        let mut users = self.users.write().await;
        let user = active_mut(&mut users, id)?;

        if let Some(first_name) = &update.first_name {
            user.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            user.last_name = last_name.clone();
        }
        if let Some(telephone) = &update.telephone {
            user.telephone = telephone.clone();
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }

    async fn set_password(&self, id: &Uuid, password_hash: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = active_mut(&mut users, id)?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn set_validation_token(
        &self,
        id: &Uuid,
        digest: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = active_mut(&mut users, id)?;
        user.validation_token_hash = Some(digest.to_string());
        user.validation_token_expires_at = Some(expires_at);
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn consume_validation_token(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<User>> {
        let mut users = self.users.write().await;
        let Some(user) = users
            .values_mut()
            .find(|u| !u.is_deleted() && u.has_validation_token(digest, now))
        else {
            return Ok(None);
        };

        user.clear_validation_token();
        user.updated_at = now;
        Ok(Some(user.clone()))
    }

    async fn mark_email_verified(&self, id: &Uuid) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = active_mut(&mut users, id)?;
        user.email_verified = true;
        user.clear_validation_token();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn soft_delete(&self, id: &Uuid) -> AppResult<()> {
        let mut users = self.users.write().await;
        let user = active_mut(&mut users, id)?;
        let now = Utc::now();
        user.deleted_at = Some(now);
        user.clear_validation_token();
        user.updated_at = now;
        Ok(())
    }
}

/// Process-local session store
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, valid or not
    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, digest: &str, record: SessionRecord) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(digest) {
            return Err(AppError::Conflict("Session token collision".to_string()));
        }
        sessions.insert(digest.to_string(), record);
        Ok(())
    }

    async fn get(&self, digest: &str) -> AppResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(digest).cloned())
    }

    async fn revoke(&self, digest: &str, at: DateTime<Utc>) -> AppResult<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(digest) {
            Some(record) if record.is_active(at) => {
                record.revoke(at);
                Ok(true)
            }
            Some(record) => {
                record.revoke(at);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_user(
        &self,
        user_id: &Uuid,
        keep: Option<&str>,
        at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let mut sessions = self.sessions.write().await;
        let mut revoked = 0;
        for (digest, record) in sessions.iter_mut() {
            if record.user_id != *user_id || keep == Some(digest.as_str()) {
                continue;
            }
            if record.is_active(at) {
                revoked += 1;
            }
            record.revoke(at);
        }
        Ok(revoked)
    }

    async fn purge_invalid(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, record| record.is_active(now));
        Ok((before - sessions.len()) as u64)
    }
}
