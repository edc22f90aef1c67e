//! Batch stock ledger service
//!
//! One row per batch identity holds the live available-quantity balance.
//! All mutation goes through the two guarded operations here; no other
//! component writes available_boxes directly.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::services::like_pattern;
use shared::models::{classify, AlertContext, BatchFlags, BatchIdentity};
use shared::types::{Page, Pagination};

/// Batch stock ledger service
#[derive(Clone)]
pub struct BatchService {
    db: PgPool,
}

/// Medicine reference joined into listing rows
#[derive(Debug, Clone, Serialize)]
pub struct MedicineRef {
    pub id: Uuid,
    pub name: String,
    pub strength: String,
}

/// Result of a batch identity lookup
#[derive(Debug, Serialize)]
pub struct BatchLookup {
    pub exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_stock_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_boxes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_purchase_price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_mrp: Option<Decimal>,
}

/// Expiry-status filter on batch listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryStatus {
    Valid,
    ExpiringSoon,
    Expired,
}

/// Stock-status filter on batch listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockStatus {
    InStock,
    LowStock,
    OutOfStock,
}

/// Sort orders supported by batch listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchSort {
    #[default]
    ExpiryAsc,
    ExpiryDesc,
    StockAsc,
    StockDesc,
}

impl BatchSort {
    pub(crate) fn order_by(&self) -> &'static str {
        match self {
            BatchSort::ExpiryAsc => "b.expiry_date ASC, b.id ASC",
            BatchSort::ExpiryDesc => "b.expiry_date DESC, b.id DESC",
            BatchSort::StockAsc => "b.available_boxes ASC, b.id ASC",
            BatchSort::StockDesc => "b.available_boxes DESC, b.id DESC",
        }
    }
}

/// Filter set for the batch listing
#[derive(Debug, Clone, Default)]
pub struct BatchListFilter {
    pub q: Option<String>,
    pub medicine_id: Option<Uuid>,
    pub pack: Option<String>,
    pub batch_no: Option<String>,
    pub expiry_status: Option<ExpiryStatus>,
    pub stock_status: Option<StockStatus>,
    pub include_out_of_stock: bool,
    pub sort: BatchSort,
    pub pagination: Pagination,
}

/// Raw listing row joined with its medicine
#[derive(Debug, FromRow)]
pub(crate) struct BatchListRow {
    pub id: Uuid,
    pub medicine_id: Uuid,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
    pub available_boxes: i32,
    pub purchase_price: Decimal,
    pub mrp: Decimal,
    pub medicine_name: String,
    pub medicine_strength: String,
}

/// One batch row as exposed to collaborators
#[derive(Debug, Serialize)]
pub struct BatchListItem {
    pub id: Uuid,
    pub medicine: MedicineRef,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
    pub available_boxes: i32,
    pub latest_purchase_price: Decimal,
    pub latest_mrp: Decimal,
    pub flags: BatchFlags,
}

impl BatchListRow {
    pub(crate) fn into_item(self, context: &AlertContext) -> BatchListItem {
        let flags = classify(self.expiry_date, self.available_boxes, context);

        BatchListItem {
            id: self.id,
            medicine: MedicineRef {
                id: self.medicine_id,
                name: self.medicine_name,
                strength: self.medicine_strength,
            },
            pack: self.pack,
            batch_no: self.batch_no,
            expiry_date: self.expiry_date,
            available_boxes: self.available_boxes,
            latest_purchase_price: self.purchase_price,
            latest_mrp: self.mrp,
            flags,
        }
    }
}

pub(crate) const BATCH_LIST_SELECT: &str = r#"
SELECT b.id, b.medicine_id, b.pack, b.batch_no, b.expiry_date, b.available_boxes,
       b.purchase_price, b.mrp, m.name AS medicine_name, m.strength AS medicine_strength
FROM batch_stocks b
JOIN medicines m ON m.id = b.medicine_id
WHERE 1=1"#;

impl BatchService {
    /// Create a new BatchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Look up a ledger row by its identity tuple.
    pub async fn lookup_identity(&self, identity: &BatchIdentity) -> AppResult<BatchLookup> {
        let row = sqlx::query_as::<_, (Uuid, i32, Decimal, Decimal)>(
            r#"
            SELECT id, available_boxes, purchase_price, mrp
            FROM batch_stocks
            WHERE medicine_id = $1 AND pack = $2 AND batch_no = $3 AND expiry_date = $4
            "#,
        )
        .bind(identity.medicine_id)
        .bind(&identity.pack)
        .bind(&identity.batch_no)
        .bind(identity.expiry_date)
        .fetch_optional(&self.db)
        .await?;

        Ok(match row {
            Some((id, available_boxes, purchase_price, mrp)) => BatchLookup {
                exists: true,
                batch_stock_id: Some(id),
                available_boxes: Some(available_boxes),
                latest_purchase_price: Some(purchase_price),
                latest_mrp: Some(mrp),
            },
            None => BatchLookup {
                exists: false,
                batch_stock_id: None,
                available_boxes: None,
                latest_purchase_price: None,
                latest_mrp: None,
            },
        })
    }

    /// Upsert-increment for one aggregated receipt line, inside the
    /// caller's transaction.
    ///
    /// Explicit two-branch form: lock and add to the row when it exists,
    /// otherwise insert the initial balance. A lost race on the identity
    /// constraint surfaces as a generic duplicate-key conflict.
    pub async fn apply_receipt_increment(
        tx: &mut Transaction<'_, Postgres>,
        identity: &BatchIdentity,
        quantity_boxes: i32,
        purchase_price: Decimal,
        mrp: Decimal,
    ) -> AppResult<()> {
        let existing: Option<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM batch_stocks
            WHERE medicine_id = $1 AND pack = $2 AND batch_no = $3 AND expiry_date = $4
            FOR UPDATE
            "#,
        )
        .bind(identity.medicine_id)
        .bind(&identity.pack)
        .bind(&identity.batch_no)
        .bind(identity.expiry_date)
        .fetch_optional(&mut **tx)
        .await?;

        match existing {
            Some((id,)) => {
                sqlx::query(
                    r#"
                    UPDATE batch_stocks
                    SET available_boxes = available_boxes + $1,
                        purchase_price = $2,
                        mrp = $3,
                        updated_at = NOW()
                    WHERE id = $4
                    "#,
                )
                .bind(quantity_boxes)
                .bind(purchase_price)
                .bind(mrp)
                .bind(id)
                .execute(&mut **tx)
                .await?;
            }
            None => {
                sqlx::query(
                    r#"
                    INSERT INTO batch_stocks
                        (medicine_id, pack, batch_no, expiry_date, available_boxes, purchase_price, mrp)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    "#,
                )
                .bind(identity.medicine_id)
                .bind(&identity.pack)
                .bind(&identity.batch_no)
                .bind(identity.expiry_date)
                .bind(quantity_boxes)
                .bind(purchase_price)
                .bind(mrp)
                .execute(&mut **tx)
                .await
                .map_err(|e| {
                    if is_unique_violation(&e, "uq_batch_stocks_identity") {
                        AppError::Conflict("batch identity".to_string())
                    } else {
                        AppError::from(e)
                    }
                })?;
            }
        }

        Ok(())
    }

    /// Guarded decrement, inside the caller's transaction.
    ///
    /// Returns the remaining balance, or None when the row no longer holds
    /// enough stock. This conditional write is the authoritative guard
    /// against concurrent issuers; the balance can never go negative.
    pub async fn apply_issue_decrement(
        tx: &mut Transaction<'_, Postgres>,
        batch_stock_id: Uuid,
        issued_boxes: i32,
    ) -> AppResult<Option<i32>> {
        let remaining: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE batch_stocks
            SET available_boxes = available_boxes - $1,
                updated_at = NOW()
            WHERE id = $2 AND available_boxes >= $1
            RETURNING available_boxes
            "#,
        )
        .bind(issued_boxes)
        .bind(batch_stock_id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(remaining)
    }

    /// Filtered, paginated batch listing with per-row alert flags.
    pub async fn list(
        &self,
        filter: &BatchListFilter,
        context: &AlertContext,
    ) -> AppResult<Page<BatchListItem>> {
        let pagination = filter.pagination.normalized();

        // Free-text queries also match medicine name/strength, resolved
        // to ids up front.
        let q_medicine_ids: Vec<Uuid> = match &filter.q {
            Some(q) => {
                sqlx::query_scalar("SELECT id FROM medicines WHERE name ILIKE $1 OR strength ILIKE $1")
                    .bind(like_pattern(q))
                    .fetch_all(&self.db)
                    .await?
            }
            None => Vec::new(),
        };

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM batch_stocks b WHERE 1=1");
        push_batch_filters(&mut count_qb, filter, context, &q_medicine_ids);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(BATCH_LIST_SELECT);
        push_batch_filters(&mut qb, filter, context, &q_medicine_ids);
        qb.push(" ORDER BY ").push(filter.sort.order_by());
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb.build_query_as::<BatchListRow>().fetch_all(&self.db).await?;
        let items = rows.into_iter().map(|r| r.into_item(context)).collect();

        Ok(Page::new(pagination, total, items))
    }
}

fn push_batch_filters(
    qb: &mut QueryBuilder<Postgres>,
    filter: &BatchListFilter,
    context: &AlertContext,
    q_medicine_ids: &[Uuid],
) {
    if let Some(medicine_id) = filter.medicine_id {
        qb.push(" AND b.medicine_id = ").push_bind(medicine_id);
    }

    if let Some(pack) = &filter.pack {
        qb.push(" AND b.pack ILIKE ").push_bind(like_pattern(pack));
    }

    if let Some(batch_no) = &filter.batch_no {
        qb.push(" AND b.batch_no ILIKE ").push_bind(like_pattern(batch_no));
    }

    match filter.expiry_status {
        Some(ExpiryStatus::Expired) => {
            qb.push(" AND b.expiry_date <= ").push_bind(context.today);
        }
        Some(ExpiryStatus::ExpiringSoon) => {
            qb.push(" AND b.expiry_date > ")
                .push_bind(context.today)
                .push(" AND b.expiry_date <= ")
                .push_bind(context.expiry_alert_end);
        }
        Some(ExpiryStatus::Valid) => {
            qb.push(" AND b.expiry_date > ").push_bind(context.expiry_alert_end);
        }
        None => {}
    }

    match filter.stock_status {
        Some(StockStatus::OutOfStock) => {
            qb.push(" AND b.available_boxes = 0");
        }
        Some(StockStatus::LowStock) => {
            qb.push(" AND b.available_boxes > 0 AND b.available_boxes <= ")
                .push_bind(context.low_stock_limit_boxes);
        }
        Some(StockStatus::InStock) => {
            qb.push(" AND b.available_boxes > ")
                .push_bind(context.low_stock_limit_boxes);
        }
        None => {}
    }

    if !filter.include_out_of_stock && filter.stock_status != Some(StockStatus::OutOfStock) {
        qb.push(" AND b.available_boxes > 0");
    }

    if let Some(q) = &filter.q {
        let pattern = like_pattern(q);
        qb.push(" AND (b.batch_no ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR b.pack ILIKE ")
            .push_bind(pattern);
        if !q_medicine_ids.is_empty() {
            qb.push(" OR b.medicine_id = ANY(")
                .push_bind(q_medicine_ids.to_vec())
                .push(")");
        }
        qb.push(")");
    }
}
