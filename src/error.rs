use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use thiserror::Error;

/// Failure taxonomy for the API. Validation and conflict errors are routine
/// caller mistakes; `CodeSpaceExhausted` and `Db` are the unexpected ones.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    Conflict(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("authentication required")]
    Unauthorized,
    #[error("you do not have permission to perform this action")]
    Forbidden,
    #[error("could not generate a unique short code")]
    CodeSpaceExhausted,
    #[error(transparent)]
    Db(#[from] DbErr),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ApiError::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }
}

/// The storage layer is the final authority for (user, target) uniqueness;
/// a losing concurrent insert surfaces here and is reported as a conflict.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::CodeSpaceExhausted | ApiError::Db(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation { field, message } => {
                let mut body = serde_json::Map::new();
                body.insert(field.to_string(), json!([message]));
                HttpResponse::BadRequest().json(body)
            }
            ApiError::Conflict(message) => {
                HttpResponse::BadRequest().json(json!({ "errors": message }))
            }
            ApiError::NotFound(what) => {
                HttpResponse::NotFound().json(json!({ "detail": format!("{} not found", what) }))
            }
            ApiError::Unauthorized => HttpResponse::Unauthorized()
                .json(json!({ "detail": "Authentication credentials were not provided" })),
            ApiError::Forbidden => HttpResponse::Forbidden()
                .json(json!({ "detail": "You do not have permission to perform this action" })),
            ApiError::CodeSpaceExhausted => {
                log::error!("short link code space exhausted: {}", self);
                HttpResponse::InternalServerError()
                    .json(json!({ "errors": "Could not generate a unique short code" }))
            }
            ApiError::Db(err) => {
                log::error!("Database error: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "errors": "Internal server error" }))
            }
            ApiError::Internal(err) => {
                log::error!("Internal error: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(json!({ "errors": "Internal server error" }))
            }
        }
    }
}
