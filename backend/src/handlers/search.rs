//! HTTP handlers for receipt search and price history

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{default_limit, default_page};
use crate::services::search::{
    PriceHistory, ReceiptSearchFilter, ReceiptSearchItem, SearchService,
};
use crate::AppState;
use shared::types::{Page, Pagination};

#[derive(Debug, Deserialize)]
pub struct ReceiptSearchQuery {
    pub supplier_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub medicine_id: Option<Uuid>,
    pub pack: Option<String>,
    pub batch_no: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct PriceHistoryQuery {
    pub medicine_id: Uuid,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Search receipt items joined to their headers
pub async fn receipt_search(
    State(state): State<AppState>,
    Query(query): Query<ReceiptSearchQuery>,
) -> AppResult<Json<Page<ReceiptSearchItem>>> {
    let filter = ReceiptSearchFilter {
        supplier_id: query.supplier_id,
        invoice_number: query.invoice_number,
        medicine_id: query.medicine_id,
        pack: query.pack,
        batch_no: query.batch_no,
        date_from: query.date_from,
        date_to: query.date_to,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
        },
    };

    let service = SearchService::new(state.db);
    let page = service.receipt_search(&filter).await?;
    Ok(Json(page))
}

/// Purchase price history for a medicine, latest first
pub async fn price_history(
    State(state): State<AppState>,
    Query(query): Query<PriceHistoryQuery>,
) -> AppResult<Json<PriceHistory>> {
    let service = SearchService::new(state.db);
    let history = service.price_history(query.medicine_id, query.limit).await?;
    Ok(Json(history))
}
