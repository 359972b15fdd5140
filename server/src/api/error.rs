use axum::{
    extract::rejection::{FormRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::QueryError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Query(#[from] QueryError),

    #[error("Could not read the submitted form")]
    Form(#[from] FormRejection),

    #[error("Invalid path")]
    Path(#[from] PathRejection),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SerializableError {
    pub status: u16,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Error {
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Query(QueryError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Error::Query(QueryError::Validation { .. }) => StatusCode::BAD_REQUEST,
            Error::Form(e) => e.status(),
            Error::Path(e) => e.status(),
            Error::Query(QueryError::OperationFailed(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn title(&self) -> String {
        match self {
            Error::Query(QueryError::NotFound { .. }) => "Not found".to_string(),
            Error::Query(QueryError::Validation { .. }) | Error::Form(_) | Error::Path(_) => {
                "Bad request".to_string()
            }
            Error::Query(QueryError::OperationFailed(_)) => {
                "An error occurred, the operation could not be completed".to_string()
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error! {error = %self, "Request failed"};
        } else {
            tracing::warn! {error = %self, %status, "Request rejected"};
        }
        let detail = match &self {
            Error::Form(e) => Some(e.body_text()),
            Error::Path(e) => Some(e.body_text()),
            e => Some(e.to_string()),
        };
        let err = SerializableError {
            status: u16::from(status),
            title: self.title(),
            detail,
        };
        (status, Json(err)).into_response()
    }
}
