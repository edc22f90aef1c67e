//! HTTP handlers for stock issue endpoints

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{default_limit, default_page};
use crate::middleware::CurrentUser;
use crate::services::stock_issue::{
    CreateStockIssueInput, FefoSuggestion, StockIssueListFilter, StockIssueListItem,
    StockIssueResult, StockIssueService,
};
use crate::AppState;
use shared::types::{Page, Pagination};

#[derive(Debug, Deserialize)]
pub struct FefoSuggestQuery {
    pub medicine_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct StockIssueListQuery {
    pub medicine_id: Option<Uuid>,
    pub batch_stock_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Suggest a batch for issue, earliest expiry first
pub async fn fefo_suggest(
    State(state): State<AppState>,
    Query(query): Query<FefoSuggestQuery>,
) -> AppResult<Json<FefoSuggestion>> {
    let service = StockIssueService::new(state.db);
    let suggestion = service.fefo_suggest(query.medicine_id).await?;
    Ok(Json(suggestion))
}

/// Record a stock issue against one batch
pub async fn create_stock_issue(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateStockIssueInput>,
) -> AppResult<Json<StockIssueResult>> {
    let service = StockIssueService::new(state.db);
    let result = service.create_issue(input, current_user.0.user_id).await?;
    Ok(Json(result))
}

/// List stock issues with filters
pub async fn list_stock_issues(
    State(state): State<AppState>,
    Query(query): Query<StockIssueListQuery>,
) -> AppResult<Json<Page<StockIssueListItem>>> {
    let filter = StockIssueListFilter {
        medicine_id: query.medicine_id,
        batch_stock_id: query.batch_stock_id,
        date_from: query.date_from,
        date_to: query.date_to,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
        },
    };

    let service = StockIssueService::new(state.db);
    let page = service.list(&filter).await?;
    Ok(Json(page))
}
