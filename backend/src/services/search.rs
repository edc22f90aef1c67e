//! Cross-record search over the receipt-item trail
//!
//! Receipt items are the immutable price history; searching them joined
//! to their headers answers "when did we buy this batch and at what
//! price" without touching the ledger.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::services::batch::MedicineRef;
use crate::services::receipt::SupplierRef;
use shared::types::{Page, Pagination};

/// Search service
#[derive(Clone)]
pub struct SearchService {
    db: PgPool,
}

/// Filter set for receipt item search
#[derive(Debug, Clone, Default)]
pub struct ReceiptSearchFilter {
    pub supplier_id: Option<Uuid>,
    pub invoice_number: Option<String>,
    pub medicine_id: Option<Uuid>,
    pub pack: Option<String>,
    pub batch_no: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub pagination: Pagination,
}

#[derive(Debug, FromRow)]
struct ReceiptSearchRow {
    supplier_id: Uuid,
    supplier_name: String,
    invoice_number: String,
    invoice_date: NaiveDate,
    medicine_id: Uuid,
    medicine_name: String,
    medicine_strength: String,
    pack: String,
    batch_no: String,
    expiry_date: NaiveDate,
    purchase_price: Decimal,
    mrp: Decimal,
    receipt_id: Uuid,
}

/// One matching receipt line with its header context
#[derive(Debug, Serialize)]
pub struct ReceiptSearchItem {
    pub supplier: SupplierRef,
    pub invoice_number: String,
    pub invoice_date: NaiveDate,
    pub medicine: MedicineRef,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
    pub purchase_price: Decimal,
    pub mrp: Decimal,
    pub receipt_id: Uuid,
}

#[derive(Debug, FromRow)]
struct PricePointRow {
    invoice_date: NaiveDate,
    purchase_price: Decimal,
    mrp: Decimal,
    supplier: String,
    invoice_number: String,
}

/// One historical purchase price for a medicine
#[derive(Debug, Clone, Serialize)]
pub struct PricePoint {
    pub invoice_date: NaiveDate,
    pub purchase_price: Decimal,
    pub mrp: Decimal,
    pub supplier: String,
    pub invoice_number: String,
}

/// Purchase price history for a medicine, latest first
#[derive(Debug, Serialize)]
pub struct PriceHistory {
    pub medicine: MedicineRef,
    pub latest: Option<PricePoint>,
    pub history: Vec<PricePoint>,
}

impl SearchService {
    /// Create a new SearchService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Search receipt items joined to their headers.
    pub async fn receipt_search(
        &self,
        filter: &ReceiptSearchFilter,
    ) -> AppResult<Page<ReceiptSearchItem>> {
        let pagination = filter.pagination.normalized();

        let mut count_qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM purchase_receipt_items i
            JOIN purchase_receipts r ON r.id = i.receipt_id
            WHERE 1=1"#,
        );
        push_search_filters(&mut count_qb, filter);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            r#"
            SELECT s.id AS supplier_id, s.name AS supplier_name,
                   r.invoice_number, r.invoice_date,
                   m.id AS medicine_id, m.name AS medicine_name, m.strength AS medicine_strength,
                   i.pack, i.batch_no, i.expiry_date, i.purchase_price, i.mrp,
                   r.id AS receipt_id
            FROM purchase_receipt_items i
            JOIN purchase_receipts r ON r.id = i.receipt_id
            JOIN suppliers s ON s.id = r.supplier_id
            JOIN medicines m ON m.id = i.medicine_id
            WHERE 1=1"#,
        );
        push_search_filters(&mut qb, filter);
        qb.push(" ORDER BY r.invoice_date DESC, i.id DESC");
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb
            .build_query_as::<ReceiptSearchRow>()
            .fetch_all(&self.db)
            .await?;

        let items = rows
            .into_iter()
            .map(|row| ReceiptSearchItem {
                supplier: SupplierRef {
                    id: row.supplier_id,
                    name: row.supplier_name,
                },
                invoice_number: row.invoice_number,
                invoice_date: row.invoice_date,
                medicine: MedicineRef {
                    id: row.medicine_id,
                    name: row.medicine_name,
                    strength: row.medicine_strength,
                },
                pack: row.pack,
                batch_no: row.batch_no,
                expiry_date: row.expiry_date,
                purchase_price: row.purchase_price,
                mrp: row.mrp,
                receipt_id: row.receipt_id,
            })
            .collect();

        Ok(Page::new(pagination, total, items))
    }

    /// Most recent purchase prices for a medicine, latest first.
    pub async fn price_history(&self, medicine_id: Uuid, limit: u32) -> AppResult<PriceHistory> {
        let medicine = sqlx::query_as::<_, (Uuid, String, String)>(
            "SELECT id, name, strength FROM medicines WHERE id = $1",
        )
        .bind(medicine_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Medicine".to_string()))?;

        let rows = sqlx::query_as::<_, PricePointRow>(
            r#"
            SELECT r.invoice_date, i.purchase_price, i.mrp,
                   s.name AS supplier, r.invoice_number
            FROM purchase_receipt_items i
            JOIN purchase_receipts r ON r.id = i.receipt_id
            JOIN suppliers s ON s.id = r.supplier_id
            WHERE i.medicine_id = $1
            ORDER BY r.invoice_date DESC, i.id DESC
            LIMIT $2
            "#,
        )
        .bind(medicine_id)
        .bind(i64::from(limit.clamp(1, 100)))
        .fetch_all(&self.db)
        .await?;

        let history: Vec<PricePoint> = rows
            .into_iter()
            .map(|row| PricePoint {
                invoice_date: row.invoice_date,
                purchase_price: row.purchase_price,
                mrp: row.mrp,
                supplier: row.supplier,
                invoice_number: row.invoice_number,
            })
            .collect();

        Ok(PriceHistory {
            medicine: MedicineRef {
                id: medicine.0,
                name: medicine.1,
                strength: medicine.2,
            },
            latest: history.first().cloned(),
            history,
        })
    }
}

fn push_search_filters(qb: &mut QueryBuilder<Postgres>, filter: &ReceiptSearchFilter) {
    if let Some(medicine_id) = filter.medicine_id {
        qb.push(" AND i.medicine_id = ").push_bind(medicine_id);
    }

    if let Some(pack) = &filter.pack {
        qb.push(" AND i.pack = ").push_bind(pack.clone());
    }

    if let Some(batch_no) = &filter.batch_no {
        qb.push(" AND i.batch_no = ").push_bind(batch_no.clone());
    }

    if let Some(supplier_id) = filter.supplier_id {
        qb.push(" AND r.supplier_id = ").push_bind(supplier_id);
    }

    if let Some(invoice_number) = &filter.invoice_number {
        qb.push(" AND r.invoice_number = ").push_bind(invoice_number.clone());
    }

    if let Some(date_from) = filter.date_from {
        qb.push(" AND r.invoice_date >= ").push_bind(date_from);
    }

    if let Some(date_to) = filter.date_to {
        qb.push(" AND r.invoice_date <= ").push_bind(date_to);
    }
}
