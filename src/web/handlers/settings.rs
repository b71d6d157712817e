//! Settings handlers.

use axum::{extract::State, Json};
use std::sync::Arc;

use super::AppState;
use crate::settings::SettingsProvider;
use crate::web::dto::{ApiResponse, SettingsResponse, UpdateSettingsRequest};
use crate::web::error::ApiError;

/// GET /api/settings - Current integration settings, key masked.
pub async fn get_settings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<SettingsResponse>>, ApiError> {
    let settings = state.settings.get().await?;
    Ok(Json(ApiResponse::new(SettingsResponse::from(
        settings.as_ref(),
    ))))
}

/// PUT /api/settings - Validate and save integration settings.
pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    Json(req): Json<UpdateSettingsRequest>,
) -> Result<Json<ApiResponse<SettingsResponse>>, ApiError> {
    let current = state.settings.get().await?;
    let saved = state.settings.save(req.apply(&current)).await?;
    Ok(Json(ApiResponse::new(SettingsResponse::from(saved.as_ref()))))
}
