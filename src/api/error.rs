//! Error responses

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use log::error;

use crate::api::dto::{ApiResponse, INVALID_MESSAGE};
use crate::error::CertError;

impl IntoResponse for CertError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            CertError::NotFound(_) => INVALID_MESSAGE.to_string(),
            other => {
                if status.is_server_error() {
                    error!("Request failed ({}): {}", self.error_code(), other);
                }
                other.to_string()
            }
        };

        (status, Json(ApiResponse::<()>::failure(message))).into_response()
    }
}
