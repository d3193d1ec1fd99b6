//! HTTP rendering of domain errors.
//!
//! Every failure leaves the API as `{ "success": false, "message": ... }`.
//! A missing token is 401; an invalid or expired one is 403, matching the
//! distinction clients rely on to decide between "log in" and "log in again".

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use clinic_core::ClinicError;

pub struct ApiError(ClinicError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ClinicError> for ApiError {
    fn from(err: ClinicError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ClinicError::InvalidInput(_) | ClinicError::Conflict(_) => StatusCode::BAD_REQUEST,
            ClinicError::InvalidCredentials | ClinicError::MissingToken => {
                StatusCode::UNAUTHORIZED
            }
            ClinicError::InvalidToken
            | ClinicError::TokenExpired
            | ClinicError::Forbidden(_) => StatusCode::FORBIDDEN,
            ClinicError::NotFound(_) => StatusCode::NOT_FOUND,
            ClinicError::StorageDirCreation(_)
            | ClinicError::FileRead(_)
            | ClinicError::FileWrite(_)
            | ClinicError::Serialization(_)
            | ClinicError::Deserialization(_)
            | ClinicError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("internal error: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}
