//! HTTP handlers for alert listing endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::{default_limit, default_page};
use crate::services::batch::{BatchListItem, BatchSort};
use crate::services::{AlertsService, SettingsService};
use crate::AppState;
use shared::models::AlertKind;
use shared::types::{Page, Pagination};

#[derive(Debug, Deserialize)]
pub struct AlertListQuery {
    pub sort: Option<BatchSort>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

async fn list_alerts(
    state: AppState,
    kind: AlertKind,
    query: AlertListQuery,
) -> AppResult<Json<Page<BatchListItem>>> {
    let context = SettingsService::new(state.db.clone())
        .resolve_context()
        .await?;

    let service = AlertsService::new(state.db);
    let page = service
        .list_alert_batches(
            kind,
            query.sort,
            Pagination {
                page: query.page,
                limit: query.limit,
            },
            &context,
        )
        .await?;

    Ok(Json(page))
}

/// Batches expiring within the alert window
pub async fn list_expiring_soon_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Page<BatchListItem>>> {
    list_alerts(state, AlertKind::ExpiringSoon, query).await
}

/// Batches already expired
pub async fn list_expired_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Page<BatchListItem>>> {
    list_alerts(state, AlertKind::Expired, query).await
}

/// Batches at or below the low-stock limit
pub async fn list_low_stock_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Page<BatchListItem>>> {
    list_alerts(state, AlertKind::LowStock, query).await
}

/// Batches with nothing left
pub async fn list_out_of_stock_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertListQuery>,
) -> AppResult<Json<Page<BatchListItem>>> {
    list_alerts(state, AlertKind::OutOfStock, query).await
}
