//! Purchase receipt ingestion and read side
//!
//! Ingestion runs as one transaction: header insert, unaggregated item
//! inserts for the audit trail, identity aggregation, ledger increments
//! and the post-update balance read. Any failure rolls the whole receipt
//! back; no partial balance change is ever observable.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::services::batch::{BatchService, MedicineRef};
use crate::services::like_pattern;
use shared::models::{aggregate_lines, BatchIdentity, PaymentMode, ReceiptLine, ReceiptType};
use shared::types::{Page, Pagination};
use shared::validation::{validate_identity_field, validate_price, validate_quantity_boxes};

/// Receipt ingestion service
#[derive(Clone)]
pub struct ReceiptService {
    db: PgPool,
}

/// Input for creating a purchase receipt
#[derive(Debug, Deserialize)]
pub struct CreateReceiptInput {
    pub supplier_id: Uuid,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub payment_mode: PaymentMode,
    pub receipt_type: ReceiptType,
    pub items: Vec<ReceiptItemInput>,
}

/// One submitted receipt line
#[derive(Debug, Deserialize)]
pub struct ReceiptItemInput {
    pub medicine_id: Uuid,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
    pub quantity_boxes: i32,
    pub purchase_price: Decimal,
    pub mrp: Decimal,
}

/// Post-update ledger balance for one touched identity
#[derive(Debug, Serialize)]
pub struct BatchUpdate {
    pub batch_stock_id: Uuid,
    pub available_boxes: i32,
}

/// Result of receipt ingestion
#[derive(Debug, Serialize)]
pub struct CreateReceiptResult {
    pub receipt_id: Uuid,
    pub batch_updates: Vec<BatchUpdate>,
}

/// Supplier reference joined into listing rows
#[derive(Debug, Clone, Serialize)]
pub struct SupplierRef {
    pub id: Uuid,
    pub name: String,
}

/// User reference joined into listing rows
#[derive(Debug, Clone, Serialize)]
pub struct UserRef {
    pub id: Uuid,
    pub full_name: String,
}

/// Filter set for the receipt listing
#[derive(Debug, Clone, Default)]
pub struct ReceiptListFilter {
    pub supplier_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub pagination: Pagination,
}

#[derive(Debug, FromRow)]
struct ReceiptListRow {
    id: Uuid,
    invoice_number: String,
    invoice_date: NaiveDate,
    payment_mode: String,
    receipt_type: String,
    created_at: DateTime<Utc>,
    supplier_id: Uuid,
    supplier_name: String,
    created_by_id: Uuid,
    created_by_name: String,
    item_count: i64,
}

/// One receipt header as exposed on listings
#[derive(Debug, Serialize)]
pub struct ReceiptListItem {
    pub id: Uuid,
    pub supplier: SupplierRef,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub payment_mode: String,
    pub receipt_type: String,
    pub created_by: UserRef,
    pub created_at: DateTime<Utc>,
    pub item_count: i64,
}

#[derive(Debug, FromRow)]
struct ReceiptItemRow {
    id: Uuid,
    medicine_id: Uuid,
    medicine_name: String,
    medicine_strength: String,
    pack: String,
    batch_no: String,
    expiry_date: NaiveDate,
    quantity_boxes: i32,
    purchase_price: Decimal,
    mrp: Decimal,
}

/// One recorded receipt line with its medicine
#[derive(Debug, Serialize)]
pub struct ReceiptDetailItem {
    pub id: Uuid,
    pub medicine: MedicineRef,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
    pub quantity_boxes: i32,
    pub purchase_price: Decimal,
    pub mrp: Decimal,
}

/// Receipt header plus its recorded lines in submission order
#[derive(Debug, Serialize)]
pub struct ReceiptDetail {
    pub receipt: ReceiptListItem,
    pub items: Vec<ReceiptDetailItem>,
}

impl ReceiptService {
    /// Create a new ReceiptService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Record a supplier purchase as one atomic unit.
    pub async fn create_receipt(
        &self,
        input: CreateReceiptInput,
        user_id: Uuid,
    ) -> AppResult<CreateReceiptResult> {
        if input.receipt_type != ReceiptType::NormalPurchase {
            return Err(AppError::Validation {
                field: "receipt_type".to_string(),
                message: "Only NORMAL_PURCHASE receipts are accepted".to_string(),
            });
        }

        validate_identity_field(&input.invoice_number).map_err(|msg| AppError::Validation {
            field: "invoice_number".to_string(),
            message: msg.to_string(),
        })?;

        if input.items.is_empty() {
            return Err(AppError::Validation {
                field: "items".to_string(),
                message: "At least one item is required".to_string(),
            });
        }

        let lines = Self::to_lines(&input.items)?;

        let mut tx = self.db.begin().await?;

        let receipt_id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO purchase_receipts
                (supplier_id, invoice_number, invoice_date, payment_mode, receipt_type, created_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(input.supplier_id)
        .bind(input.invoice_number.trim())
        .bind(input.invoice_date)
        .bind(input.payment_mode.as_str())
        .bind(input.receipt_type.as_str())
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e, "uq_purchase_receipts_supplier_invoice") {
                AppError::DuplicateInvoice
            } else {
                AppError::from(e)
            }
        })?;

        // Immutable audit trail: one row per submitted line, unaggregated.
        for line in &lines {
            sqlx::query(
                r#"
                INSERT INTO purchase_receipt_items
                    (receipt_id, medicine_id, pack, batch_no, expiry_date,
                     quantity_boxes, purchase_price, mrp)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(receipt_id)
            .bind(line.identity.medicine_id)
            .bind(&line.identity.pack)
            .bind(&line.identity.batch_no)
            .bind(line.identity.expiry_date)
            .bind(line.quantity_boxes)
            .bind(line.purchase_price)
            .bind(line.mrp)
            .execute(&mut *tx)
            .await?;
        }

        let grouped = aggregate_lines(&lines);

        for line in &grouped {
            BatchService::apply_receipt_increment(
                &mut tx,
                &line.identity,
                line.quantity_boxes,
                line.purchase_price,
                line.mrp,
            )
            .await?;
        }

        // Post-update balances, read inside the same transaction.
        let mut batch_updates = Vec::with_capacity(grouped.len());
        for line in &grouped {
            let (batch_stock_id, available_boxes): (Uuid, i32) = sqlx::query_as(
                r#"
                SELECT id, available_boxes
                FROM batch_stocks
                WHERE medicine_id = $1 AND pack = $2 AND batch_no = $3 AND expiry_date = $4
                "#,
            )
            .bind(line.identity.medicine_id)
            .bind(&line.identity.pack)
            .bind(&line.identity.batch_no)
            .bind(line.identity.expiry_date)
            .fetch_one(&mut *tx)
            .await?;

            batch_updates.push(BatchUpdate {
                batch_stock_id,
                available_boxes,
            });
        }

        tx.commit().await?;

        Ok(CreateReceiptResult {
            receipt_id,
            batch_updates,
        })
    }

    fn to_lines(items: &[ReceiptItemInput]) -> AppResult<Vec<ReceiptLine>> {
        items
            .iter()
            .map(|item| {
                validate_identity_field(&item.pack).map_err(|msg| AppError::Validation {
                    field: "pack".to_string(),
                    message: msg.to_string(),
                })?;
                validate_identity_field(&item.batch_no).map_err(|msg| AppError::Validation {
                    field: "batch_no".to_string(),
                    message: msg.to_string(),
                })?;
                validate_quantity_boxes(item.quantity_boxes).map_err(|msg| {
                    AppError::Validation {
                        field: "quantity_boxes".to_string(),
                        message: msg.to_string(),
                    }
                })?;
                validate_price(item.purchase_price).map_err(|msg| AppError::Validation {
                    field: "purchase_price".to_string(),
                    message: msg.to_string(),
                })?;
                validate_price(item.mrp).map_err(|msg| AppError::Validation {
                    field: "mrp".to_string(),
                    message: msg.to_string(),
                })?;

                Ok(ReceiptLine {
                    identity: BatchIdentity {
                        medicine_id: item.medicine_id,
                        pack: item.pack.trim().to_string(),
                        batch_no: item.batch_no.trim().to_string(),
                        expiry_date: item.expiry_date,
                    },
                    quantity_boxes: item.quantity_boxes,
                    purchase_price: item.purchase_price,
                    mrp: item.mrp,
                })
            })
            .collect()
    }

    /// Paginated receipt listing with supplier and creator joined in.
    pub async fn list(&self, filter: &ReceiptListFilter) -> AppResult<Page<ReceiptListItem>> {
        let pagination = filter.pagination.normalized();

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM purchase_receipts r WHERE 1=1");
        push_receipt_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT r.id, r.invoice_number, r.invoice_date, r.payment_mode, r.receipt_type,
                   r.created_at, s.id AS supplier_id, s.name AS supplier_name,
                   u.id AS created_by_id, u.full_name AS created_by_name,
                   (SELECT COUNT(*) FROM purchase_receipt_items i WHERE i.receipt_id = r.id) AS item_count
            FROM purchase_receipts r
            JOIN suppliers s ON s.id = r.supplier_id
            JOIN users u ON u.id = r.created_by
            WHERE 1=1"#,
        );
        push_receipt_filters(&mut qb, filter);
        qb.push(" ORDER BY r.invoice_date DESC, r.id DESC");
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb.build_query_as::<ReceiptListRow>().fetch_all(&self.db).await?;
        let items = rows.into_iter().map(into_list_item).collect();

        Ok(Page::new(pagination, total, items))
    }

    /// Header plus recorded lines for one receipt.
    pub async fn detail(&self, receipt_id: Uuid) -> AppResult<ReceiptDetail> {
        let header = sqlx::query_as::<_, ReceiptListRow>(
            r#"
            SELECT r.id, r.invoice_number, r.invoice_date, r.payment_mode, r.receipt_type,
                   r.created_at, s.id AS supplier_id, s.name AS supplier_name,
                   u.id AS created_by_id, u.full_name AS created_by_name,
                   (SELECT COUNT(*) FROM purchase_receipt_items i WHERE i.receipt_id = r.id) AS item_count
            FROM purchase_receipts r
            JOIN suppliers s ON s.id = r.supplier_id
            JOIN users u ON u.id = r.created_by
            WHERE r.id = $1
            "#,
        )
        .bind(receipt_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Purchase receipt".to_string()))?;

        let items = sqlx::query_as::<_, ReceiptItemRow>(
            r#"
            SELECT i.id, i.medicine_id, m.name AS medicine_name, m.strength AS medicine_strength,
                   i.pack, i.batch_no, i.expiry_date, i.quantity_boxes, i.purchase_price, i.mrp
            FROM purchase_receipt_items i
            JOIN medicines m ON m.id = i.medicine_id
            WHERE i.receipt_id = $1
            ORDER BY i.created_at ASC, i.id ASC
            "#,
        )
        .bind(receipt_id)
        .fetch_all(&self.db)
        .await?;

        Ok(ReceiptDetail {
            receipt: into_list_item(header),
            items: items
                .into_iter()
                .map(|row| ReceiptDetailItem {
                    id: row.id,
                    medicine: MedicineRef {
                        id: row.medicine_id,
                        name: row.medicine_name,
                        strength: row.medicine_strength,
                    },
                    pack: row.pack,
                    batch_no: row.batch_no,
                    expiry_date: row.expiry_date,
                    quantity_boxes: row.quantity_boxes,
                    purchase_price: row.purchase_price,
                    mrp: row.mrp,
                })
                .collect(),
        })
    }
}

fn into_list_item(row: ReceiptListRow) -> ReceiptListItem {
    ReceiptListItem {
        id: row.id,
        supplier: SupplierRef {
            id: row.supplier_id,
            name: row.supplier_name,
        },
        invoice_number: row.invoice_number,
        invoice_date: row.invoice_date,
        payment_mode: row.payment_mode,
        receipt_type: row.receipt_type,
        created_by: UserRef {
            id: row.created_by_id,
            full_name: row.created_by_name,
        },
        created_at: row.created_at,
        item_count: row.item_count,
    }
}

fn push_receipt_filters(qb: &mut QueryBuilder<Postgres>, filter: &ReceiptListFilter) {
    if let Some(supplier_id) = filter.supplier_id {
        qb.push(" AND r.supplier_id = ").push_bind(supplier_id);
    }

    if let Some(invoice_number) = &filter.invoice_number {
        qb.push(" AND r.invoice_number ILIKE ")
            .push_bind(like_pattern(invoice_number));
    }

    if let Some(date_from) = filter.date_from {
        qb.push(" AND r.invoice_date >= ").push_bind(date_from);
    }

    if let Some(date_to) = filter.date_to {
        qb.push(" AND r.invoice_date <= ").push_bind(date_to);
    }
}
