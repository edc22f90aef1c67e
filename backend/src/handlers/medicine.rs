//! HTTP handlers for medicine master data endpoints

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppResult;
use crate::handlers::{default_limit, default_page};
use crate::services::medicine::{
    CreateMedicineInput, Medicine, MedicineService, UpdateMedicineInput,
};
use crate::AppState;
use shared::types::{Page, Pagination};

#[derive(Debug, Deserialize)]
pub struct MedicineListQuery {
    pub q: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

/// Create a medicine
pub async fn create_medicine(
    State(state): State<AppState>,
    Json(input): Json<CreateMedicineInput>,
) -> AppResult<Json<Medicine>> {
    let service = MedicineService::new(state.db);
    let medicine = service.create(input).await?;
    Ok(Json(medicine))
}

/// List medicines with optional search
pub async fn list_medicines(
    State(state): State<AppState>,
    Query(query): Query<MedicineListQuery>,
) -> AppResult<Json<Page<Medicine>>> {
    let service = MedicineService::new(state.db);
    let page = service
        .list(
            query.q.as_deref(),
            Pagination {
                page: query.page,
                limit: query.limit,
            },
        )
        .await?;
    Ok(Json(page))
}

/// Get a medicine by id
pub async fn get_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
) -> AppResult<Json<Medicine>> {
    let service = MedicineService::new(state.db);
    let medicine = service.get(medicine_id).await?;
    Ok(Json(medicine))
}

/// Update a medicine
pub async fn update_medicine(
    State(state): State<AppState>,
    Path(medicine_id): Path<Uuid>,
    Json(input): Json<UpdateMedicineInput>,
) -> AppResult<Json<Medicine>> {
    let service = MedicineService::new(state.db);
    let medicine = service.update(medicine_id, input).await?;
    Ok(Json(medicine))
}
