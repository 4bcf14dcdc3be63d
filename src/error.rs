/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - repo error / auth error を統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub details: &'static str,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    // Unknown email and wrong password share this variant on purpose:
    // the response must not reveal which half failed.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("email address already in use")]
    DuplicateEmail,

    #[error("authentication required")]
    Unauthenticated,

    #[error("access denied")]
    Forbidden,

    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, details) = match &self {
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "request validation failed"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "authentication failed"),
            AppError::DuplicateEmail => (StatusCode::BAD_REQUEST, "registration rejected"),
            AppError::Unauthenticated => (StatusCode::UNAUTHORIZED, "no valid session"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "insufficient permissions"),
            AppError::NotFound { .. } => (StatusCode::NOT_FOUND, "resource does not exist"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "unexpected error"),
        };

        let body = ErrorBody {
            timestamp: Utc::now(),
            message: self.to_string(),
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        match e {
            // The only unique constraint in this schema is users.email.
            RepoError::Conflict => AppError::DuplicateEmail,
            RepoError::Decode(_) | RepoError::Db(_) => {
                tracing::error!(error = %e, "repository failure");
                AppError::Internal
            }
        }
    }
}
