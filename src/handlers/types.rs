//! Response envelope shared by every endpoint.

use axum::Json;
use serde::Serialize;

/// Success envelope: `{"success": true, "data": ...}`.
///
/// The error counterpart lives in [`crate::errors::ErrorBody`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

/// Wrap a payload in the success envelope.
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
    })
}
