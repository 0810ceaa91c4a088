use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::error::ApiError;

/// JSON success response with an optional non-200 status.
///
/// The payload is written as-is (`{"token": ..}`, `[..]`); only errors carry the
/// `{"success": false, ..}` envelope.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None,
        }
    }

    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// 201 Created
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        match serde_json::to_value(&self.data) {
            Ok(value) => (status, Json(value)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiError::internal_server_error("Failed to serialize response data").into_response()
            }
        }
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;
