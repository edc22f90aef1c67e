//! HTTP handlers for threshold settings endpoints

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::settings::{SettingsService, StoredSettings, UpdateSettingsInput};
use crate::AppState;

/// Current threshold settings, created with defaults on first read
pub async fn get_settings(State(state): State<AppState>) -> AppResult<Json<StoredSettings>> {
    let service = SettingsService::new(state.db);
    let settings = service.get().await?;
    Ok(Json(settings))
}

/// Update threshold settings
pub async fn patch_settings(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<UpdateSettingsInput>,
) -> AppResult<Json<StoredSettings>> {
    let service = SettingsService::new(state.db);
    let settings = service.update(input, current_user.0.user_id).await?;
    Ok(Json(settings))
}
