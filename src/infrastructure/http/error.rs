//! HTTP error rendering
//!
//! Conflict errors become `{code, message}` bodies with a status per error
//! group. Anything else is an internal error.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::errors::{ConflictError, ErrorKind};
use crate::domain::value_objects::InvalidId;

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorBody,
}

impl ApiError {
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: ErrorBody {
                code: code.to_string(),
                message: message.into(),
            },
        }
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Invalid => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Corruption => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<ConflictError>() {
            Some(conflict_error) => Self {
                status: status_for(conflict_error.kind()),
                body: ErrorBody {
                    code: conflict_error.code().to_string(),
                    message: conflict_error.to_string(),
                },
            },
            None => {
                tracing::error!("Request failed: {:#}", err);
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    body: ErrorBody {
                        code: "INTERNAL".to_string(),
                        message: format!("{:#}", err),
                    },
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// Parse a path segment into a typed id
pub fn parse_id<T: FromStr<Err = InvalidId>>(raw: &str) -> Result<T, ApiError> {
    raw.parse()
        .map_err(|err: InvalidId| ApiError::bad_request("INVALID_ID", err.to_string()))
}
