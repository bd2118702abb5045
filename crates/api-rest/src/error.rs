//! Mapping of storage errors onto HTTP responses.

use axum::{http::StatusCode, response::Json};
use cenad_files::FilesError;
use serde::Serialize;
use utoipa::ToSchema;

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

pub(crate) type ApiError = (StatusCode, Json<ErrorRes>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorRes {
            error: message.into(),
        }),
    )
}

impl From<FilesError> for ErrorRes {
    fn from(e: FilesError) -> Self {
        Self {
            error: e.to_string(),
        }
    }
}

/// Maps a storage error to its status code.
///
/// I/O failures are logged here and reported without filesystem detail.
pub(crate) fn files_error(e: FilesError) -> ApiError {
    match e {
        FilesError::InvalidArgument(_) => (StatusCode::BAD_REQUEST, Json(e.into())),
        FilesError::NotFound(_) | FilesError::UnknownCategory(_) => {
            (StatusCode::NOT_FOUND, Json(e.into()))
        }
        FilesError::InvalidConfig(_) | FilesError::Io(_) => {
            tracing::error!("Storage error: {:?}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

pub(crate) fn join_error(e: tokio::task::JoinError) -> ApiError {
    tracing::error!("Blocking storage task failed: {:?}", e);
    api_error(StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
}
