//! User request DTOs

use serde::{Deserialize, Deserializer};
use uuid::Uuid;
use validator::Validate;

use crate::{
    constants::{MAX_PASSWORD_LENGTH, MAX_PROFILE_FIELD_LENGTH, MIN_PASSWORD_LENGTH},
    models::ProfileUpdate,
    services::SignupInput,
    utils::validation::{validate_not_blank, validate_telephone, validate_username},
};

/// Accept `true`/`false` as JSON booleans or as strings
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Ok(true),
            "false" | "" => Ok(false),
            other => Err(serde::de::Error::custom(format!(
                "isAdmin must be true or false, got {:?}",
                other
            ))),
        },
    }
}

/// User registration request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(
        length(min = 1, max = MAX_PROFILE_FIELD_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub first_name: String,

    #[validate(
        length(min = 1, max = MAX_PROFILE_FIELD_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub last_name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub password: String,

    #[validate(custom(function = "validate_telephone"))]
    pub telephone: String,

    #[validate(custom(function = "validate_username"))]
    pub user_name: String,

    #[validate(
        length(min = 1, max = MAX_PROFILE_FIELD_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub country: String,

    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_admin: bool,
}

impl From<SignupRequest> for SignupInput {
    fn from(req: SignupRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            user_name: req.user_name,
            email: req.email,
            password: req.password,
            telephone: req.telephone,
            country: req.country,
            is_admin: req.is_admin,
        }
    }
}

/// User login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email)]
    pub email: String,
}

/// Password update with an emailed validation token
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1))]
    pub validation_token: String,

    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub password: String,
}

/// Password change for an authenticated user
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub user_id: Uuid,

    #[validate(length(min = 1))]
    pub old_password: String,

    #[validate(length(min = MIN_PASSWORD_LENGTH, max = MAX_PASSWORD_LENGTH))]
    pub new_password: String,
}

/// Partial profile edit
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EditUserRequest {
    #[validate(
        length(min = 1, max = MAX_PROFILE_FIELD_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub first_name: Option<String>,

    #[validate(
        length(min = 1, max = MAX_PROFILE_FIELD_LENGTH),
        custom(function = "validate_not_blank")
    )]
    pub last_name: Option<String>,

    #[validate(custom(function = "validate_telephone"))]
    pub telephone: Option<String>,
}

impl From<EditUserRequest> for ProfileUpdate {
    fn from(req: EditUserRequest) -> Self {
        Self {
            first_name: req.first_name,
            last_name: req.last_name,
            telephone: req.telephone,
        }
    }
}

/// Email verification
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub user_id: Uuid,
}
