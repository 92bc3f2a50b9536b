use axum::{extract::State, http::StatusCode, Json};

use crate::{dtos::ErrorResponse, AppState};

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 503, description = "Service is unhealthy", body = ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<ErrorResponse>)> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Identity store health check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse::message("Identity store unavailable")),
        )
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "checks": {
            "store": "up"
        }
    })))
}
