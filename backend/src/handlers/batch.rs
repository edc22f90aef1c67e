//! HTTP handlers for batch ledger endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{default_limit, default_page, default_true};
use crate::services::batch::{
    BatchListFilter, BatchListItem, BatchLookup, BatchService, BatchSort, ExpiryStatus,
    StockStatus,
};
use crate::services::SettingsService;
use crate::AppState;
use shared::models::BatchIdentity;
use shared::types::{Page, Pagination};

#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    pub q: Option<String>,
    pub medicine_id: Option<Uuid>,
    pub pack: Option<String>,
    pub batch_no: Option<String>,
    pub expiry_status: Option<ExpiryStatus>,
    pub stock_status: Option<StockStatus>,
    #[serde(default = "default_true")]
    pub include_out_of_stock: bool,
    #[serde(default)]
    pub sort: BatchSort,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct BatchLookupQuery {
    pub medicine_id: Uuid,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
}

/// List batches with filters and per-row alert flags
pub async fn list_batches(
    State(state): State<AppState>,
    Query(query): Query<BatchListQuery>,
) -> AppResult<Json<Page<BatchListItem>>> {
    let context = SettingsService::new(state.db.clone())
        .resolve_context()
        .await?;

    let filter = BatchListFilter {
        q: query.q,
        medicine_id: query.medicine_id,
        pack: query.pack,
        batch_no: query.batch_no,
        expiry_status: query.expiry_status,
        stock_status: query.stock_status,
        include_out_of_stock: query.include_out_of_stock,
        sort: query.sort,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
        },
    };

    let service = BatchService::new(state.db);
    let page = service.list(&filter, &context).await?;
    Ok(Json(page))
}

/// Look up one ledger row by its identity tuple
pub async fn lookup_batch(
    State(state): State<AppState>,
    Query(query): Query<BatchLookupQuery>,
) -> AppResult<Json<BatchLookup>> {
    let identity = BatchIdentity {
        medicine_id: query.medicine_id,
        pack: query.pack,
        batch_no: query.batch_no,
        expiry_date: query.expiry_date,
    };

    let service = BatchService::new(state.db);
    let lookup = service.lookup_identity(&identity).await?;
    Ok(Json(lookup))
}
