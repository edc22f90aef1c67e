//! Alert listings over the batch ledger
//!
//! Each alert category maps to one range predicate over expiry_date or
//! available_boxes. The dashboard summary counts with the same predicates
//! so listings and counts can never disagree.

use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppResult;
use crate::services::batch::{BatchListItem, BatchListRow, BatchSort, BATCH_LIST_SELECT};
use shared::models::{AlertContext, AlertKind};
use shared::types::{Page, Pagination};

/// Alert listing service
#[derive(Clone)]
pub struct AlertsService {
    db: PgPool,
}

impl AlertsService {
    /// Create a new AlertsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Paginated batches matching one alert category.
    pub async fn list_alert_batches(
        &self,
        kind: AlertKind,
        sort: Option<BatchSort>,
        pagination: Pagination,
        context: &AlertContext,
    ) -> AppResult<Page<BatchListItem>> {
        let pagination = pagination.normalized();
        let sort = sort.unwrap_or_else(|| default_sort(kind));

        let mut count_qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM batch_stocks b WHERE 1=1");
        push_alert_predicate(&mut count_qb, kind, context);
        let total: i64 = count_qb.build_query_scalar().fetch_one(&self.db).await?;

        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(BATCH_LIST_SELECT);
        push_alert_predicate(&mut qb, kind, context);
        qb.push(" ORDER BY ").push(sort.order_by());
        qb.push(" LIMIT ")
            .push_bind(i64::from(pagination.limit))
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = qb.build_query_as::<BatchListRow>().fetch_all(&self.db).await?;
        let items = rows.into_iter().map(|r| r.into_item(context)).collect();

        Ok(Page::new(pagination, total, items))
    }
}

/// SQL form of [`AlertKind::matches`]; listings and dashboard counts both
/// go through here.
pub(crate) fn push_alert_predicate(
    qb: &mut QueryBuilder<Postgres>,
    kind: AlertKind,
    context: &AlertContext,
) {
    match kind {
        AlertKind::Expired => {
            qb.push(" AND b.expiry_date <= ").push_bind(context.today);
        }
        AlertKind::ExpiringSoon => {
            qb.push(" AND b.expiry_date > ")
                .push_bind(context.today)
                .push(" AND b.expiry_date <= ")
                .push_bind(context.expiry_alert_end);
        }
        AlertKind::LowStock => {
            qb.push(" AND b.available_boxes > 0 AND b.available_boxes <= ")
                .push_bind(context.low_stock_limit_boxes);
        }
        AlertKind::OutOfStock => {
            qb.push(" AND b.available_boxes = 0");
        }
    }
}

fn default_sort(kind: AlertKind) -> BatchSort {
    match kind {
        AlertKind::Expired | AlertKind::ExpiringSoon => BatchSort::ExpiryAsc,
        AlertKind::LowStock | AlertKind::OutOfStock => BatchSort::StockAsc,
    }
}
