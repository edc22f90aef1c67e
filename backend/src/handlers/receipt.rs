//! HTTP handlers for purchase receipt endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{default_limit, default_page};
use crate::middleware::CurrentUser;
use crate::services::receipt::{
    CreateReceiptInput, CreateReceiptResult, ReceiptDetail, ReceiptListFilter, ReceiptListItem,
    ReceiptService,
};
use crate::AppState;
use shared::types::{Page, Pagination};

#[derive(Debug, Deserialize)]
pub struct ReceiptListQuery {
    pub supplier_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Record a supplier purchase
pub async fn create_receipt(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateReceiptInput>,
) -> AppResult<Json<CreateReceiptResult>> {
    let service = ReceiptService::new(state.db);
    let result = service
        .create_receipt(input, current_user.0.user_id)
        .await?;
    Ok(Json(result))
}

/// List receipts with filters
pub async fn list_receipts(
    State(state): State<AppState>,
    Query(query): Query<ReceiptListQuery>,
) -> AppResult<Json<Page<ReceiptListItem>>> {
    let filter = ReceiptListFilter {
        supplier_id: query.supplier_id,
        invoice_number: query.invoice_number,
        date_from: query.date_from,
        date_to: query.date_to,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
        },
    };

    let service = ReceiptService::new(state.db);
    let page = service.list(&filter).await?;
    Ok(Json(page))
}

/// Get one receipt with its recorded lines
pub async fn get_receipt_detail(
    State(state): State<AppState>,
    Path(receipt_id): Path<Uuid>,
) -> AppResult<Json<ReceiptDetail>> {
    let service = ReceiptService::new(state.db);
    let detail = service.detail(receipt_id).await?;
    Ok(Json(detail))
}
