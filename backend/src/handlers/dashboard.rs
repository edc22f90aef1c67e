//! HTTP handlers for the dashboard summary

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::dashboard::{DashboardService, DashboardSummary};
use crate::services::SettingsService;
use crate::AppState;

/// Dashboard counts: total medicines plus the four alert categories
pub async fn get_dashboard_summary(
    State(state): State<AppState>,
) -> AppResult<Json<DashboardSummary>> {
    let context = SettingsService::new(state.db.clone())
        .resolve_context()
        .await?;

    let service = DashboardService::new(state.db);
    let summary = service.summary(&context).await?;
    Ok(Json(summary))
}
