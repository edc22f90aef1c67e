//! Stock issue service: FEFO suggestion and guarded depletion
//!
//! Issue creation runs as one transaction. The conditional decrement in
//! the ledger is the authoritative stock guard; the earlier balance check
//! only exists to give a precise error before the write is attempted.

use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::batch::{BatchService, MedicineRef};
use crate::services::receipt::UserRef;
use shared::models::issue_date_allowed;
use shared::types::{Page, Pagination};
use shared::validation::validate_quantity_boxes;

/// Stock issue service
#[derive(Clone)]
pub struct StockIssueService {
    db: PgPool,
}

/// One issuable batch as returned by the FEFO suggestion
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FefoBatch {
    pub batch_stock_id: Uuid,
    pub batch_no: String,
    pub pack: String,
    pub expiry_date: NaiveDate,
    pub available_boxes: i32,
}

/// FEFO suggestion: earliest-expiry batch first, then the alternatives
#[derive(Debug, Serialize)]
pub struct FefoSuggestion {
    pub suggested: Option<FefoBatch>,
    pub alternatives: Vec<FefoBatch>,
}

/// Input for creating a stock issue
#[derive(Debug, Deserialize)]
pub struct CreateStockIssueInput {
    pub batch_stock_id: Uuid,
    pub issued_boxes: i32,
    pub issued_date: NaiveDate,
    pub remark: Option<String>,
}

/// Result of a recorded stock issue
#[derive(Debug, Serialize)]
pub struct StockIssueResult {
    pub stock_issue_id: Uuid,
    pub batch_stock_id: Uuid,
    pub remaining_boxes: i32,
}

/// Filter set for the stock issue listing
#[derive(Debug, Clone, Default)]
pub struct StockIssueListFilter {
    pub medicine_id: Option<Uuid>,
    pub batch_stock_id: Option<Uuid>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub pagination: Pagination,
}

#[derive(Debug, FromRow)]
struct StockIssueListRow {
    id: Uuid,
    issued_date: NaiveDate,
    issued_boxes: i32,
    remark: String,
    created_at: DateTime<Utc>,
    batch_stock_id: Uuid,
    batch_no: String,
    pack: String,
    expiry_date: NaiveDate,
    medicine_id: Uuid,
    medicine_name: String,
    medicine_strength: String,
    created_by_id: Uuid,
    created_by_name: String,
}

/// Batch reference joined into issue listings
#[derive(Debug, Serialize)]
pub struct IssueBatchRef {
    pub id: Uuid,
    pub batch_no: String,
    pub pack: String,
    pub expiry_date: NaiveDate,
}

/// One stock issue as exposed on listings
#[derive(Debug, Serialize)]
pub struct StockIssueListItem {
    pub id: Uuid,
    pub issued_date: NaiveDate,
    pub issued_boxes: i32,
    pub remark: String,
    pub created_at: DateTime<Utc>,
    pub batch: IssueBatchRef,
    pub medicine: MedicineRef,
    pub created_by: UserRef,
}

#[derive(Debug, FromRow)]
struct BatchRow {
    id: Uuid,
    medicine_id: Uuid,
    pack: String,
    batch_no: String,
    expiry_date: NaiveDate,
    available_boxes: i32,
}

impl StockIssueService {
    /// Create a new StockIssueService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Suggest a batch for issue: earliest expiry first.
    ///
    /// Batches expiring on or before today are never suggested, whatever
    /// their remaining balance.
    pub async fn fefo_suggest(&self, medicine_id: Uuid) -> AppResult<FefoSuggestion> {
        let today = Local::now().date_naive();

        let alternatives = sqlx::query_as::<_, FefoBatch>(
            r#"
            SELECT id AS batch_stock_id, batch_no, pack, expiry_date, available_boxes
            FROM batch_stocks
            WHERE medicine_id = $1 AND expiry_date > $2 AND available_boxes > 0
            ORDER BY expiry_date ASC, batch_no ASC, id ASC
            LIMIT 20
            "#,
        )
        .bind(medicine_id)
        .bind(today)
        .fetch_all(&self.db)
        .await?;

        Ok(FefoSuggestion {
            suggested: alternatives.first().cloned(),
            alternatives,
        })
    }

    /// Record a depletion against one batch as one atomic unit.
    pub async fn create_issue(
        &self,
        input: CreateStockIssueInput,
        user_id: Uuid,
    ) -> AppResult<StockIssueResult> {
        validate_quantity_boxes(input.issued_boxes).map_err(|msg| AppError::Validation {
            field: "issued_boxes".to_string(),
            message: msg.to_string(),
        })?;

        let mut tx = self.db.begin().await?;

        let batch = sqlx::query_as::<_, BatchRow>(
            r#"
            SELECT id, medicine_id, pack, batch_no, expiry_date, available_boxes
            FROM batch_stocks
            WHERE id = $1
            "#,
        )
        .bind(input.batch_stock_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound("Batch stock".to_string()))?;

        // Expiry is evaluated at issue time, not at the supplied issued_date.
        let today = Local::now().date_naive();
        if batch.expiry_date <= today {
            return Err(AppError::BatchExpired);
        }

        if input.issued_boxes > batch.available_boxes {
            return Err(AppError::InsufficientStock);
        }

        // Earliest invoice date across every receipt that ever contributed
        // to this identity; absent history skips the check.
        let first_receipt_date: Option<NaiveDate> = sqlx::query_scalar(
            r#"
            SELECT MIN(r.invoice_date)
            FROM purchase_receipt_items i
            JOIN purchase_receipts r ON r.id = i.receipt_id
            WHERE i.medicine_id = $1 AND i.pack = $2 AND i.batch_no = $3 AND i.expiry_date = $4
            "#,
        )
        .bind(batch.medicine_id)
        .bind(&batch.pack)
        .bind(&batch.batch_no)
        .bind(batch.expiry_date)
        .fetch_one(&mut *tx)
        .await?;

        if !issue_date_allowed(input.issued_date, first_receipt_date) {
            return Err(AppError::InvalidIssueDate);
        }

        let remaining_boxes =
            BatchService::apply_issue_decrement(&mut tx, batch.id, input.issued_boxes)
                .await?
                .ok_or(AppError::InsufficientStock)?;

        let remark = input.remark.as_deref().unwrap_or("").trim().to_string();

        let stock_issue_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO stock_issues (batch_stock_id, issued_boxes, issued_date, remark, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(batch.id)
        .bind(input.issued_boxes)
        .bind(input.issued_date)
        .bind(&remark)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(StockIssueResult {
            stock_issue_id,
            batch_stock_id: batch.id,
            remaining_boxes,
        })
    }

    /// Paginated issue history with batch, medicine and creator joined in.
    pub async fn list(&self, filter: &StockIssueListFilter) -> AppResult<Page<StockIssueListItem>> {
        let pagination = filter.pagination.normalized();

        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM stock_issues si
            JOIN batch_stocks b ON b.id = si.batch_stock_id
            WHERE 1=1"#,
        );
        push_issue_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT si.id, si.issued_date, si.issued_boxes, si.remark, si.created_at,
                   b.id AS batch_stock_id, b.batch_no, b.pack, b.expiry_date,
                   m.id AS medicine_id, m.name AS medicine_name, m.strength AS medicine_strength,
                   u.id AS created_by_id, u.full_name AS created_by_name
            FROM stock_issues si
            JOIN batch_stocks b ON b.id = si.batch_stock_id
            JOIN medicines m ON m.id = b.medicine_id
            JOIN users u ON u.id = si.created_by
            WHERE 1=1"#,
        );
        push_issue_filters(&mut qb, filter);
        qb.push(" ORDER BY si.issued_date DESC, si.id DESC");
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb
            .build_query_as::<StockIssueListRow>()
            .fetch_all(&self.db)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| StockIssueListItem {
                id: row.id,
                issued_date: row.issued_date,
                issued_boxes: row.issued_boxes,
                remark: row.remark,
                created_at: row.created_at,
                batch: IssueBatchRef {
                    id: row.batch_stock_id,
                    batch_no: row.batch_no,
                    pack: row.pack,
                    expiry_date: row.expiry_date,
                },
                medicine: MedicineRef {
                    id: row.medicine_id,
                    name: row.medicine_name,
                    strength: row.medicine_strength,
                },
                created_by: UserRef {
                    id: row.created_by_id,
                    full_name: row.created_by_name,
                },
            })
            .collect();

        Ok(Page::new(pagination, total, items))
    }
}

fn push_issue_filters(qb: &mut QueryBuilder<Postgres>, filter: &StockIssueListFilter) {
    if let Some(batch_stock_id) = filter.batch_stock_id {
        qb.push(" AND si.batch_stock_id = ").push_bind(batch_stock_id);
    }

    if let Some(medicine_id) = filter.medicine_id {
        qb.push(" AND b.medicine_id = ").push_bind(medicine_id);
    }

    if let Some(date_from) = filter.date_from {
        qb.push(" AND si.issued_date >= ").push_bind(date_from);
    }

    if let Some(date_to) = filter.date_to {
        qb.push(" AND si.issued_date <= ").push_bind(date_to);
    }
}
