//! User model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// User database model
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub telephone: String,
    pub country: String,
    pub is_admin: bool,
    pub email_verified: bool,
    /// SHA-256 digest of the outstanding validation token
    #[serde(skip_serializing)]
    pub validation_token_hash: Option<String>,
    #[serde(skip_serializing)]
    pub validation_token_expires_at: Option<DateTime<Utc>>,
    pub created_on: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// Build a fresh, unverified user record
    pub fn new(new_user: NewUser) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            user_name: new_user.user_name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            telephone: new_user.telephone,
            country: new_user.country,
            is_admin: new_user.is_admin,
            email_verified: false,
            validation_token_hash: new_user.validation_token_hash,
            validation_token_expires_at: new_user.validation_token_expires_at,
            created_on: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Soft-deleted users keep their identifiers reserved but are otherwise invisible
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Whether `digest` matches an outstanding, unexpired validation token
    pub fn has_validation_token(&self, digest: &str, now: DateTime<Utc>) -> bool {
        match (&self.validation_token_hash, self.validation_token_expires_at) {
            (Some(stored), Some(expires_at)) => stored == digest && expires_at > now,
            _ => false,
        }
    }

    pub fn clear_validation_token(&mut self) {
        self.validation_token_hash = None;
        self.validation_token_expires_at = None;
    }
}

/// Fields required to insert a user; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub password_hash: String,
    pub telephone: String,
    pub country: String,
    pub is_admin: bool,
    pub validation_token_hash: Option<String>,
    pub validation_token_expires_at: Option<DateTime<Utc>>,
}

/// Partial profile edit; `None` leaves the field untouched
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub telephone: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.telephone.is_none()
    }
}
