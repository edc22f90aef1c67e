//! Alert classification for batch stock
//!
//! A batch is classified against the global threshold settings and a
//! calendar window derived from the server's local day. Listings and
//! dashboard counts must use the same predicates as the per-row flags.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Default low-stock limit when no settings record exists yet.
pub const DEFAULT_LOW_STOCK_LIMIT_BOXES: i32 = 2;

/// Default expiring-soon window when no settings record exists yet.
pub const DEFAULT_EXPIRY_ALERT_DAYS: i32 = 30;

/// Threshold settings plus the calendar window they apply to.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AlertContext {
    pub low_stock_limit_boxes: i32,
    pub expiry_alert_days: i32,
    /// Server-local calendar day of the current instant.
    pub today: NaiveDate,
    /// Last day of the expiring-soon window.
    pub expiry_alert_end: NaiveDate,
}

impl AlertContext {
    pub fn new(low_stock_limit_boxes: i32, expiry_alert_days: i32, today: NaiveDate) -> Self {
        Self {
            low_stock_limit_boxes,
            expiry_alert_days,
            today,
            expiry_alert_end: today + Duration::days(i64::from(expiry_alert_days)),
        }
    }

    /// Whole days until expiry; zero or negative means expired.
    pub fn days_left(&self, expiry_date: NaiveDate) -> i64 {
        (expiry_date - self.today).num_days()
    }
}

/// The four operational flags derived for a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchFlags {
    pub expired: bool,
    pub expiring_soon: bool,
    pub low_stock: bool,
    pub out_of_stock: bool,
}

/// Classify one batch against the context.
///
/// A batch with zero boxes is out_of_stock and never low_stock; the two
/// flags are mutually exclusive by construction.
pub fn classify(expiry_date: NaiveDate, available_boxes: i32, context: &AlertContext) -> BatchFlags {
    let days_left = context.days_left(expiry_date);

    BatchFlags {
        expired: days_left <= 0,
        expiring_soon: days_left > 0 && days_left <= i64::from(context.expiry_alert_days),
        low_stock: available_boxes > 0 && available_boxes <= context.low_stock_limit_boxes,
        out_of_stock: available_boxes == 0,
    }
}

/// Alert categories used by alert listings and the dashboard summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertKind {
    Expired,
    ExpiringSoon,
    LowStock,
    OutOfStock,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::Expired => "EXPIRED",
            AlertKind::ExpiringSoon => "EXPIRING_SOON",
            AlertKind::LowStock => "LOW_STOCK",
            AlertKind::OutOfStock => "OUT_OF_STOCK",
        }
    }

    /// The range predicate equivalent to the matching flag in [`classify`].
    ///
    /// The SQL filters used for alert listings and dashboard counts mirror
    /// exactly this shape.
    pub fn matches(
        &self,
        expiry_date: NaiveDate,
        available_boxes: i32,
        context: &AlertContext,
    ) -> bool {
        match self {
            AlertKind::Expired => expiry_date <= context.today,
            AlertKind::ExpiringSoon => {
                expiry_date > context.today && expiry_date <= context.expiry_alert_end
            }
            AlertKind::LowStock => {
                available_boxes > 0 && available_boxes <= context.low_stock_limit_boxes
            }
            AlertKind::OutOfStock => available_boxes == 0,
        }
    }
}
