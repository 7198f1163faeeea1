//! User response DTOs

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{IssuedToken, User};

/// Public view of a user; never carries credentials or tokens
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetails {
    pub user_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub user_name: String,
    pub email: String,
    pub telephone: String,
    pub country: String,
    pub is_admin: bool,
    pub email_verified: bool,
    pub created_on: DateTime<Utc>,
}

impl From<User> for UserDetails {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            user_name: user.user_name,
            email: user.email,
            telephone: user.telephone,
            country: user.country,
            is_admin: user.is_admin,
            email_verified: user.email_verified,
            created_on: user.created_on,
        }
    }
}

/// Login success payload
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub auth_token: String,
    pub expires_at: DateTime<Utc>,
    pub user_details: UserDetails,
}

impl LoginResponse {
    pub fn new(issued: IssuedToken, user: User) -> Self {
        Self {
            auth_token: issued.token,
            expires_at: issued.expires_at,
            user_details: user.into(),
        }
    }
}
