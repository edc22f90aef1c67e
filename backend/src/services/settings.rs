//! Threshold settings service
//!
//! The settings record is a lazily-created singleton. Creation is guarded
//! by the marker column's primary key, so concurrent first reads across
//! server instances converge on one row without in-process locking.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use shared::models::AlertContext;

/// Settings service owning the global threshold record
#[derive(Clone)]
pub struct SettingsService {
    db: PgPool,
}

/// The stored singleton settings record
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredSettings {
    pub low_stock_limit_boxes: i32,
    pub expiry_alert_days: i32,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

/// Input for updating settings; at least one field must be present
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSettingsInput {
    #[validate(range(min = 0))]
    pub low_stock_limit_boxes: Option<i32>,
    #[validate(range(min = 0))]
    pub expiry_alert_days: Option<i32>,
}

impl SettingsService {
    /// Create a new SettingsService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Fetch the settings record, creating it with defaults if absent.
    pub async fn get(&self) -> AppResult<StoredSettings> {
        if let Some(settings) = self.fetch().await? {
            return Ok(settings);
        }

        // Won or lost, the marker guarantees a single row exists afterwards.
        sqlx::query("INSERT INTO settings (singleton) VALUES (TRUE) ON CONFLICT (singleton) DO NOTHING")
            .execute(&self.db)
            .await?;

        self.fetch().await?.ok_or_else(|| {
            AppError::Configuration("settings record missing after creation".to_string())
        })
    }

    async fn fetch(&self) -> AppResult<Option<StoredSettings>> {
        let settings = sqlx::query_as::<_, StoredSettings>(
            r#"
            SELECT low_stock_limit_boxes, expiry_alert_days, updated_by, updated_at
            FROM settings
            WHERE singleton
            "#,
        )
        .fetch_optional(&self.db)
        .await?;

        Ok(settings)
    }

    /// Resolve the thresholds plus the calendar window of the current
    /// instant in the server's local day.
    pub async fn resolve_context(&self) -> AppResult<AlertContext> {
        let settings = self.get().await?;
        let today = Local::now().date_naive();

        Ok(AlertContext::new(
            settings.low_stock_limit_boxes,
            settings.expiry_alert_days,
            today,
        ))
    }

    /// Partial update; absent fields keep their current values.
    pub async fn update(
        &self,
        input: UpdateSettingsInput,
        user_id: Uuid,
    ) -> AppResult<StoredSettings> {
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if input.low_stock_limit_boxes.is_none() && input.expiry_alert_days.is_none() {
            return Err(AppError::ValidationError(
                "At least one field is required".to_string(),
            ));
        }

        let current = self.get().await?;
        let low_stock_limit_boxes = input
            .low_stock_limit_boxes
            .unwrap_or(current.low_stock_limit_boxes);
        let expiry_alert_days = input.expiry_alert_days.unwrap_or(current.expiry_alert_days);

        let settings = sqlx::query_as::<_, StoredSettings>(
            r#"
            INSERT INTO settings (singleton, low_stock_limit_boxes, expiry_alert_days, updated_by, updated_at)
            VALUES (TRUE, $1, $2, $3, NOW())
            ON CONFLICT (singleton) DO UPDATE
            SET low_stock_limit_boxes = EXCLUDED.low_stock_limit_boxes,
                expiry_alert_days = EXCLUDED.expiry_alert_days,
                updated_by = EXCLUDED.updated_by,
                updated_at = NOW()
            RETURNING low_stock_limit_boxes, expiry_alert_days, updated_by, updated_at
            "#,
        )
        .bind(low_stock_limit_boxes)
        .bind(expiry_alert_days)
        .bind(user_id)
        .fetch_one(&self.db)
        .await?;

        Ok(settings)
    }
}
