//! Authentication middleware
//!
//! Token sources, highest priority first:
//! 1. `Authorization: Bearer <token>` (canonical)
//! 2. `authToken` header (deprecated)
//! 3. `authToken` field of a JSON body (deprecated)
//! 4. `authToken` query parameter (deprecated)

use axum::{
    body::{self, Body},
    extract::{FromRequestParts, Query, Request, State},
    http::{
        header::{AUTHORIZATION, CONTENT_LENGTH},
        request::Parts,
        HeaderMap,
    },
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    constants::transport::{BEARER_PREFIX, LEGACY_TOKEN_FIELD},
    error::{AppError, AppResult},
    state::AppState,
};

/// Authenticated caller attached to the request by `auth_middleware`
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    pub is_admin: bool,
    /// The bearer token presented with this request
    pub token: String,
}

impl std::fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("id", &self.id)
            .field("is_admin", &self.is_admin)
            .finish_non_exhaustive()
    }
}

impl AuthenticatedUser {
    /// Owners may act on their own account, admins on any
    pub fn ensure_can_manage(&self, target: &Uuid) -> AppResult<()> {
        if self.id == *target || self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Cannot act on another user's account".to_string(),
            ))
        }
    }

    pub fn ensure_admin(&self) -> AppResult<()> {
        if self.is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin privileges required".to_string()))
        }
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Where a token was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    AuthorizationHeader,
    LegacyHeader,
    Body,
    Query,
}

#[derive(Debug, Default, Deserialize)]
struct TokenCarrier {
    #[serde(rename = "authToken")]
    auth_token: Option<String>,
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

/// Credentials after a `Bearer ` scheme; the scheme name is case-insensitive
fn bearer_credentials(value: &str) -> Option<String> {
    let (scheme, credentials) = value.split_at_checked(BEARER_PREFIX.len())?;
    scheme
        .eq_ignore_ascii_case(BEARER_PREFIX)
        .then(|| credentials.to_string())
}

fn token_from_headers(headers: &HeaderMap) -> Option<(String, TokenSource)> {
    if let Some(value) = headers.get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        if let Some(token) = non_empty(bearer_credentials(value)) {
            return Some((token, TokenSource::AuthorizationHeader));
        }
    }

    headers
        .get(LEGACY_TOKEN_FIELD)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| non_empty(Some(value.to_string())))
        .map(|token| (token, TokenSource::LegacyHeader))
}

fn token_from_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice::<TokenCarrier>(bytes)
        .ok()
        .and_then(|carrier| non_empty(carrier.auth_token))
}

/// Find the token in priority order.
///
/// The body is only buffered when no header carries a token; it is then
/// reattached so downstream extractors still see it.
pub async fn extract_token(
    request: Request<Body>,
    max_body_bytes: usize,
) -> AppResult<(Option<(String, TokenSource)>, Request<Body>)> {
    if let Some(found) = token_from_headers(request.headers()) {
        return Ok((Some(found), request));
    }

    let declared_len = request
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_len.is_some_and(|len| len > max_body_bytes) {
        return Err(AppError::PayloadTooLarge);
    }

    let (parts, body) = request.into_parts();
    let bytes = body::to_bytes(body, max_body_bytes)
        .await
        .map_err(|_| AppError::Validation("Request body too large or unreadable".to_string()))?;

    let found = token_from_body(&bytes)
        .map(|token| (token, TokenSource::Body))
        .or_else(|| {
            Query::<TokenCarrier>::try_from_uri(&parts.uri)
                .ok()
                .and_then(|Query(carrier)| non_empty(carrier.auth_token))
                .map(|token| (token, TokenSource::Query))
        });

    Ok((found, Request::from_parts(parts, Body::from(bytes))))
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path().to_string();

    let (found, mut request) =
        extract_token(request, state.config().server.max_body_bytes).await?;

    let Some((token, source)) = found else {
        debug!(path = %path, "Auth failed: no token presented");
        return Err(AppError::Unauthorized);
    };

    if source != TokenSource::AuthorizationHeader {
        debug!(path = %path, source = ?source, "Token supplied through deprecated transport");
    }

    let user_id = state.tokens().validate(&token).await.map_err(|e| {
        debug!(path = %path, error = %e, "Auth failed: token rejected");
        e
    })?;

    // The account may have been deleted since the token was issued
    let user = state.users().find_by_id(&user_id).await?.ok_or_else(|| {
        debug!(path = %path, user_id = %user_id, "Auth failed: token owner no longer exists");
        AppError::InvalidToken
    })?;

    debug!(path = %path, user_id = %user.id, is_admin = user.is_admin, "User authenticated");

    request.extensions_mut().insert(AuthenticatedUser {
        id: user.id,
        is_admin: user.is_admin,
        token,
    });
    Ok(next.run(request).await)
}
