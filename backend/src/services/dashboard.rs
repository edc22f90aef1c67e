//! Dashboard summary over the batch ledger

use serde::Serialize;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::AppResult;
use crate::services::alerts::push_alert_predicate;
use shared::models::{AlertContext, AlertKind};

/// Dashboard service
#[derive(Clone)]
pub struct DashboardService {
    db: PgPool,
}

/// Counts shown on the dashboard
#[derive(Debug, Serialize)]
pub struct DashboardSummary {
    pub total_medicines: i64,
    pub expiring_soon_batches: i64,
    pub expired_batches: i64,
    pub low_stock_batches: i64,
    pub out_of_stock_batches: i64,
}

impl DashboardService {
    /// Create a new DashboardService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Summary counts, computed with the same predicates as the alert
    /// listings for the same snapshot.
    pub async fn summary(&self, context: &AlertContext) -> AppResult<DashboardSummary> {
        let total_medicines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM medicines")
            .fetch_one(&self.db)
            .await?;

        Ok(DashboardSummary {
            total_medicines,
            expiring_soon_batches: self.count_alert(AlertKind::ExpiringSoon, context).await?,
            expired_batches: self.count_alert(AlertKind::Expired, context).await?,
            low_stock_batches: self.count_alert(AlertKind::LowStock, context).await?,
            out_of_stock_batches: self.count_alert(AlertKind::OutOfStock, context).await?,
        })
    }

    async fn count_alert(&self, kind: AlertKind, context: &AlertContext) -> AppResult<i64> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM batch_stocks b WHERE 1=1");
        push_alert_predicate(&mut qb, kind, context);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.db).await?;
        Ok(count)
    }
}
