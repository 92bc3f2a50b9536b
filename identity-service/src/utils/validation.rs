use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use validator::Validate;

use crate::dtos::ErrorResponse;

/// Trim and lowercase an identity attribute (email or username).
///
/// Every writer of an index record must apply this before uniqueness
/// checks and storage, or the uniqueness invariant silently breaks.
pub fn normalize_identifier(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Json extractor that runs `validator` rules and rejects with 400
/// plus per-field error messages.
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|e| {
            let err_resp = ErrorResponse::message(format!("Json parse error: {}", e));
            (StatusCode::BAD_REQUEST, Json(err_resp)).into_response()
        })?;

        value.validate().map_err(|e| {
            let mut fields: HashMap<String, Vec<String>> = HashMap::new();
            for (field, errors) in e.field_errors() {
                let messages = errors
                    .iter()
                    .map(|err| {
                        err.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| err.code.to_string())
                    })
                    .collect();
                fields.insert(field.to_string(), messages);
            }
            let err_resp = ErrorResponse::fields("Validation failed", fields);
            (StatusCode::BAD_REQUEST, Json(err_resp)).into_response()
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_identifier("  User@Example.COM "), "user@example.com");
        assert_eq!(normalize_identifier("Alice1"), "alice1");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_identifier("User@Example.com");
        assert_eq!(normalize_identifier(&once), once);
    }
}
