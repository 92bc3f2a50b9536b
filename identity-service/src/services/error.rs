use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use std::collections::HashMap;
use thiserror::Error;

use crate::db::StoreError;
use crate::dtos::ErrorResponse;

/// Error taxonomy for the identity core.
///
/// Validation and conflict errors are user-correctable and returned
/// verbatim; store/internal failures return a generic message with the
/// detail only logged. Notification failures never reach this type: the
/// worker swallows them after logging.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Session is no longer active")]
    SessionRevoked,

    #[error("Account is deactivated")]
    AccountDisabled,

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ServiceError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServiceError::Validation { .. } => StatusCode::BAD_REQUEST,
            ServiceError::UsernameTaken | ServiceError::EmailTaken => StatusCode::CONFLICT,
            ServiceError::InvalidCredentials
            | ServiceError::InvalidToken
            | ServiceError::SessionRevoked => StatusCode::UNAUTHORIZED,
            ServiceError::AccountDisabled => StatusCode::FORBIDDEN,
            ServiceError::Store(_) | ServiceError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            ServiceError::Validation { field, message } => {
                let mut fields = HashMap::new();
                fields.insert(field.to_string(), vec![message.clone()]);
                ErrorResponse::fields("Validation failed", fields)
            }
            ServiceError::Store(err) => {
                tracing::error!(error = %err, "Identity store failure");
                ErrorResponse::message("Internal server error")
            }
            ServiceError::Internal(err) => {
                tracing::error!(error = %err, "Unexpected failure");
                ErrorResponse::message("Internal server error")
            }
            other => ErrorResponse::message(other.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
