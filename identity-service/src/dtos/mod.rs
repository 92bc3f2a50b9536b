pub mod auth;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::ToSchema;

/// Error body returned for every non-2xx response.
///
/// `errors` is present only for validation failures, keyed by the
/// offending request field.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "Invalid email or password")]
    pub error: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,
}

impl ErrorResponse {
    pub fn message(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            errors: None,
        }
    }

    pub fn fields(error: impl Into<String>, errors: HashMap<String, Vec<String>>) -> Self {
        Self {
            error: error.into(),
            errors: Some(errors),
        }
    }
}
