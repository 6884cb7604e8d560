use crate::modules::{repository::StoreError, sync::SyncError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use cp_tracker_libs::api::ErrorResponse;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("{0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::UserNotFound(_) => AppError::NotFound(String::from("User not found")),
            SyncError::StoreError(e) => AppError::StoreError(e),
            SyncError::FetchError(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::StoreError(StoreError::Conflict(what)) => {
                (StatusCode::CONFLICT, format!("{} already exists", what))
            }
            AppError::StoreError(e) => {
                tracing::error!("request failed cause: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, String::from("Server Error"))
            }
            AppError::Internal(cause) => {
                tracing::error!("request failed cause: {}", cause);
                (StatusCode::INTERNAL_SERVER_ERROR, String::from("Server Error"))
            }
        };

        (status, Json(ErrorResponse::new(msg))).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (AppError::NotFound(String::from("x")), StatusCode::NOT_FOUND),
            (
                AppError::Unauthorized(String::from("x")),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AppError::BadRequest(String::from("x")),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::StoreError(StoreError::Conflict(String::from("upsolve"))),
                StatusCode::CONFLICT,
            ),
            (
                AppError::from(SyncError::UserNotFound(1)),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::Internal(String::from("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }
}
