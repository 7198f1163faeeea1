//! Uniform response envelope
//!
//! Every endpoint, error and middleware rejection answers with
//! `{ error, message, status, data }` where `status` mirrors the HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub error: bool,
    pub message: String,
    pub status: u16,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 response carrying `data`
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::success(StatusCode::OK, message, Some(data))
    }

    /// Successful response with an explicit status
    pub fn success(status: StatusCode, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            error: false,
            message: message.into(),
            status: status.as_u16(),
            data,
        }
    }

    /// Error response; never carries data
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            error: true,
            message: message.into(),
            status: status.as_u16(),
            data: None,
        }
    }
}

impl ApiResponse<()> {
    /// 200 response with `data: null`
    pub fn message(message: impl Into<String>) -> Self {
        Self::success(StatusCode::OK, message, None)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
