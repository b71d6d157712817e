//! Diagnostic handlers: connection test, server version, error log.

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use super::AppState;
use crate::db::{ErrorLogEntry, ErrorLogRepository};
use crate::mailcow::{ConnectionReport, MailcowClient};
use crate::settings::SettingsProvider;
use crate::web::dto::{ApiResponse, ErrorLogQuery, VersionResponse};
use crate::web::error::ApiError;

async fn client_for(state: &AppState, require_key: bool) -> Result<MailcowClient, ApiError> {
    let settings = state.settings.get().await?;
    if settings.api_base_url.is_empty() {
        return Err(ApiError::unprocessable("API URL is not configured"));
    }
    if require_key && settings.api_key.is_empty() {
        return Err(ApiError::unprocessable("API Key is not configured"));
    }
    Ok(MailcowClient::new(
        &settings.api_base_url,
        &settings.api_key,
        &state.mailcow,
    )?)
}

/// GET /api/diagnostics/connection - List mailboxes to check URL and key.
pub async fn test_connection(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<ConnectionReport>>, ApiError> {
    let client = client_for(&state, true).await?;
    Ok(Json(ApiResponse::new(client.test_connection().await)))
}

/// GET /api/diagnostics/version - Mailcow server version.
pub async fn get_version(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<VersionResponse>>, ApiError> {
    let client = client_for(&state, false).await?;
    let version = client.get_version().await?;
    Ok(Json(ApiResponse::new(VersionResponse { version })))
}

/// GET /api/error-log - Most recent error log entries.
pub async fn list_error_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ErrorLogQuery>,
) -> Result<Json<ApiResponse<Vec<ErrorLogEntry>>>, ApiError> {
    let entries = ErrorLogRepository::new(state.db.pool())
        .list_recent(query.limit())
        .await?;
    Ok(Json(ApiResponse::new(entries)))
}
