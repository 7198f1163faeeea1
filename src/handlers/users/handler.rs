//! User handler implementations

use axum::extract::{Path, State};

use crate::{
    constants::messages,
    error::AppResult,
    handlers::{
        envelope::ApiResponse,
        extract::{parse_user_id, ValidatedJson},
    },
    middleware::auth::AuthenticatedUser,
    state::AppState,
};

use super::{
    request::{
        ChangePasswordRequest, EditUserRequest, LoginRequest, ResetPasswordRequest,
        SignupRequest, UpdatePasswordRequest, VerifyEmailRequest,
    },
    response::{LoginResponse, UserDetails},
};

/// Register a new user
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<SignupRequest>,
) -> AppResult<ApiResponse<UserDetails>> {
    let user = state.accounts().signup(payload.into()).await?;
    Ok(ApiResponse::ok(messages::USER_ADDED, user.into()))
}

/// Exchange credentials for a session token
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<ApiResponse<LoginResponse>> {
    let (issued, user) = state
        .accounts()
        .login(&payload.email, &payload.password)
        .await?;

    Ok(ApiResponse::ok(
        messages::LOGIN_SUCCESSFUL,
        LoginResponse::new(issued, user),
    ))
}

/// Send password reset instructions; the answer does not reveal whether the email exists
pub async fn reset_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state.accounts().reset_password(&payload.email).await?;
    Ok(ApiResponse::message(messages::RESET_INSTRUCTIONS_SENT))
}

pub async fn update_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UpdatePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .accounts()
        .update_password(&payload.validation_token, &payload.password)
        .await?;
    Ok(ApiResponse::message(messages::PASSWORD_UPDATED))
}

pub async fn change_password(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    ValidatedJson(payload): ValidatedJson<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    state
        .accounts()
        .change_password(
            &caller,
            &payload.user_id,
            &payload.old_password,
            &payload.new_password,
        )
        .await?;
    Ok(ApiResponse::message(messages::PASSWORD_UPDATED))
}

/// Partial profile update
pub async fn edit_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
    ValidatedJson(payload): ValidatedJson<EditUserRequest>,
) -> AppResult<ApiResponse<UserDetails>> {
    let user_id = parse_user_id(&user_id)?;
    let user = state
        .accounts()
        .edit_user(&caller, &user_id, payload.into())
        .await?;
    Ok(ApiResponse::ok(messages::USER_UPDATED, user.into()))
}

pub async fn verify_email(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<VerifyEmailRequest>,
) -> AppResult<ApiResponse<()>> {
    state.accounts().verify_email(&payload.user_id).await?;
    Ok(ApiResponse::message(messages::EMAIL_VERIFIED))
}

pub async fn delete_user(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let user_id = parse_user_id(&user_id)?;
    state.accounts().delete_user(&caller, &user_id).await?;
    Ok(ApiResponse::message(messages::USER_DELETED))
}

/// List all active users
pub async fn get_all_users(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> AppResult<ApiResponse<Vec<UserDetails>>> {
    let users = state.accounts().get_all_users(&caller).await?;
    let users = users.into_iter().map(UserDetails::from).collect();
    Ok(ApiResponse::ok(messages::ALL_USERS_FOUND, users))
}

pub async fn get_single_user(
    State(state): State<AppState>,
    _caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<UserDetails>> {
    let user_id = parse_user_id(&user_id)?;
    let user = state.accounts().get_single_user(&user_id).await?;
    Ok(ApiResponse::ok(messages::USER_FOUND, user.into()))
}

/// Revoke the token presented with this request
pub async fn logout(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    Path(user_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    let user_id = parse_user_id(&user_id)?;
    state.accounts().logout(&caller, &user_id).await?;
    Ok(ApiResponse::message(messages::LOGGED_OUT))
}
