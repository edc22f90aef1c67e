//! Medicine master data service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::like_pattern;
use shared::types::{Page, Pagination};

/// Medicine master data service
#[derive(Clone)]
pub struct MedicineService {
    db: PgPool,
}

/// Medicine record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub strength: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a medicine
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMedicineInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub strength: Option<String>,
    pub category: Option<String>,
}

/// Input for updating a medicine
#[derive(Debug, Deserialize)]
pub struct UpdateMedicineInput {
    pub name: Option<String>,
    pub strength: Option<String>,
    pub category: Option<String>,
}

impl MedicineService {
    /// Create a new MedicineService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateMedicineInput) -> AppResult<Medicine> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let name = input.name.trim().to_string();
        let strength = input.strength.as_deref().unwrap_or("").trim().to_string();
        let category = input.category.as_deref().unwrap_or("").trim().to_string();

        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            INSERT INTO medicines (name, strength, category)
            VALUES ($1, $2, $3)
            RETURNING id, name, strength, category, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&strength)
        .bind(&category)
        .fetch_one(&self.db)
        .await?;

        Ok(medicine)
    }

    /// Search over name/strength, most recently updated first.
    pub async fn list(&self, q: Option<&str>, pagination: Pagination) -> AppResult<Page<Medicine>> {
        let pagination = pagination.normalized();

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM medicines WHERE 1=1");
        push_medicine_filters(&mut count_qb, q);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, strength, category, created_at, updated_at FROM medicines WHERE 1=1",
        );
        push_medicine_filters(&mut qb, q);
        qb.push(" ORDER BY updated_at DESC, id DESC");
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let items = qb.build_query_as::<Medicine>().fetch_all(&self.db).await?;

        Ok(Page::new(pagination, total, items))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Medicine> {
        sqlx::query_as::<_, Medicine>(
            "SELECT id, name, strength, category, created_at, updated_at FROM medicines WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Medicine".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdateMedicineInput) -> AppResult<Medicine> {
        let existing = self.get(id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        let strength = input.strength.unwrap_or(existing.strength);
        let category = input.category.unwrap_or(existing.category);

        let medicine = sqlx::query_as::<_, Medicine>(
            r#"
            UPDATE medicines
            SET name = $1, strength = $2, category = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, strength, category, created_at, updated_at
            "#,
        )
        .bind(name.trim())
        .bind(strength.trim())
        .bind(category.trim())
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(medicine)
    }
}

fn push_medicine_filters(qb: &mut QueryBuilder<Postgres>, q: Option<&str>) {
    if let Some(q) = q {
        let pattern = like_pattern(q);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR strength ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
