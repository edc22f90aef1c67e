//! Supplier master data service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::like_pattern;
use shared::types::{Page, Pagination};

/// Supplier master data service
#[derive(Clone)]
pub struct SupplierService {
    db: PgPool,
}

/// Supplier record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Supplier {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a supplier
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupplierInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Input for updating a supplier
#[derive(Debug, Deserialize)]
pub struct UpdateSupplierInput {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

impl SupplierService {
    /// Create a new SupplierService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateSupplierInput) -> AppResult<Supplier> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let name = input.name.trim().to_string();
        let phone = input.phone.as_deref().unwrap_or("").trim().to_string();
        let address = input.address.as_deref().unwrap_or("").trim().to_string();

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, phone, address)
            VALUES ($1, $2, $3)
            RETURNING id, name, phone, address, created_at, updated_at
            "#,
        )
        .bind(&name)
        .bind(&phone)
        .bind(&address)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }

    /// Search over name/phone, most recently updated first.
    pub async fn list(&self, q: Option<&str>, pagination: Pagination) -> AppResult<Page<Supplier>> {
        let pagination = pagination.normalized();

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM suppliers WHERE 1=1");
        push_supplier_filters(&mut count_qb, q);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, phone, address, created_at, updated_at FROM suppliers WHERE 1=1",
        );
        push_supplier_filters(&mut qb, q);
        qb.push(" ORDER BY updated_at DESC, id DESC");
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let items = qb.build_query_as::<Supplier>().fetch_all(&self.db).await?;

        Ok(Page::new(pagination, total, items))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<Supplier> {
        sqlx::query_as::<_, Supplier>(
            "SELECT id, name, phone, address, created_at, updated_at FROM suppliers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Supplier".to_string()))
    }

    pub async fn update(&self, id: Uuid, input: UpdateSupplierInput) -> AppResult<Supplier> {
        let existing = self.get(id).await?;

        let name = input.name.unwrap_or(existing.name);
        if name.trim().is_empty() {
            return Err(AppError::Validation {
                field: "name".to_string(),
                message: "Name is required".to_string(),
            });
        }
        let phone = input.phone.unwrap_or(existing.phone);
        let address = input.address.unwrap_or(existing.address);

        let supplier = sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $1, phone = $2, address = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, name, phone, address, created_at, updated_at
            "#,
        )
        .bind(name.trim())
        .bind(phone.trim())
        .bind(address.trim())
        .bind(id)
        .fetch_one(&self.db)
        .await?;

        Ok(supplier)
    }
}

fn push_supplier_filters(qb: &mut QueryBuilder<Postgres>, q: Option<&str>) {
    if let Some(q) = q {
        let pattern = like_pattern(q);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR phone ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}
