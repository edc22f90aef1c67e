//! Alert classifier tests
//!
//! Tests for batch classification including:
//! - Flag definitions against the threshold context
//! - Mutual exclusivity of low_stock and out_of_stock
//! - Consistency between per-row flags and listing predicates

use chrono::NaiveDate;
use proptest::prelude::*;

use shared::models::{classify, AlertContext, AlertKind};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn context() -> AlertContext {
    // limit 2 boxes, 30-day window, anchored to a fixed day
    AlertContext::new(2, 30, date(2026, 3, 1))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_context_window() {
        let ctx = context();
        assert_eq!(ctx.expiry_alert_end, date(2026, 3, 31));
        assert_eq!(ctx.days_left(date(2026, 3, 2)), 1);
        assert_eq!(ctx.days_left(date(2026, 3, 1)), 0);
        assert_eq!(ctx.days_left(date(2026, 2, 28)), -1);
    }

    #[test]
    fn test_expired_on_or_before_today() {
        let ctx = context();

        assert!(classify(date(2026, 2, 20), 5, &ctx).expired);
        assert!(classify(date(2026, 3, 1), 5, &ctx).expired);
        assert!(!classify(date(2026, 3, 2), 5, &ctx).expired);
    }

    #[test]
    fn test_expiring_soon_window() {
        let ctx = context();

        // tomorrow is inside the window
        assert!(classify(date(2026, 3, 2), 5, &ctx).expiring_soon);
        // last day of the window
        assert!(classify(date(2026, 3, 31), 5, &ctx).expiring_soon);
        // one past the window
        assert!(!classify(date(2026, 4, 1), 5, &ctx).expiring_soon);
        // expired batches are not expiring-soon
        assert!(!classify(date(2026, 3, 1), 5, &ctx).expiring_soon);
    }

    #[test]
    fn test_stock_flags() {
        let ctx = context();
        let expiry = date(2027, 1, 1);

        let zero = classify(expiry, 0, &ctx);
        assert!(zero.out_of_stock);
        assert!(!zero.low_stock);

        let low = classify(expiry, 2, &ctx);
        assert!(low.low_stock);
        assert!(!low.out_of_stock);

        let healthy = classify(expiry, 3, &ctx);
        assert!(!healthy.low_stock);
        assert!(!healthy.out_of_stock);
    }

    #[test]
    fn test_alert_kind_codes() {
        assert_eq!(AlertKind::Expired.as_str(), "EXPIRED");
        assert_eq!(AlertKind::ExpiringSoon.as_str(), "EXPIRING_SOON");
        assert_eq!(AlertKind::LowStock.as_str(), "LOW_STOCK");
        assert_eq!(AlertKind::OutOfStock.as_str(), "OUT_OF_STOCK");
    }

    #[test]
    fn test_flag_serialization_shape() {
        let ctx = context();
        let flags = classify(date(2026, 3, 10), 1, &ctx);

        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["expired"], false);
        assert_eq!(json["expiring_soon"], true);
        assert_eq!(json["low_stock"], true);
        assert_eq!(json["out_of_stock"], false);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn day_offset_strategy() -> impl Strategy<Value = i64> {
        -400i64..400
    }

    fn boxes_strategy() -> impl Strategy<Value = i32> {
        0i32..500
    }

    fn limit_strategy() -> impl Strategy<Value = i32> {
        0i32..50
    }

    fn window_strategy() -> impl Strategy<Value = i32> {
        0i32..120
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Per-row flags agree with the listing predicate for every kind.
        #[test]
        fn prop_flags_match_predicates(
            offset in day_offset_strategy(),
            boxes in boxes_strategy(),
            limit in limit_strategy(),
            window in window_strategy(),
        ) {
            let today = date(2026, 3, 1);
            let ctx = AlertContext::new(limit, window, today);
            let expiry = today + chrono::Duration::days(offset);

            let flags = classify(expiry, boxes, &ctx);

            prop_assert_eq!(flags.expired, AlertKind::Expired.matches(expiry, boxes, &ctx));
            prop_assert_eq!(flags.expiring_soon, AlertKind::ExpiringSoon.matches(expiry, boxes, &ctx));
            prop_assert_eq!(flags.low_stock, AlertKind::LowStock.matches(expiry, boxes, &ctx));
            prop_assert_eq!(flags.out_of_stock, AlertKind::OutOfStock.matches(expiry, boxes, &ctx));
        }

        /// A batch is never both low_stock and out_of_stock.
        #[test]
        fn prop_stock_flags_exclusive(
            offset in day_offset_strategy(),
            boxes in boxes_strategy(),
            limit in limit_strategy(),
        ) {
            let today = date(2026, 3, 1);
            let ctx = AlertContext::new(limit, 30, today);
            let expiry = today + chrono::Duration::days(offset);

            let flags = classify(expiry, boxes, &ctx);
            prop_assert!(!(flags.low_stock && flags.out_of_stock));
        }

        /// A batch is never both expired and expiring_soon.
        #[test]
        fn prop_expiry_flags_exclusive(
            offset in day_offset_strategy(),
            window in window_strategy(),
        ) {
            let today = date(2026, 3, 1);
            let ctx = AlertContext::new(2, window, today);
            let expiry = today + chrono::Duration::days(offset);

            let flags = classify(expiry, 5, &ctx);
            prop_assert!(!(flags.expired && flags.expiring_soon));
        }

        /// The expiring-soon window covers exactly days 1..=window.
        #[test]
        fn prop_expiring_soon_bounds(
            offset in day_offset_strategy(),
            window in window_strategy(),
        ) {
            let today = date(2026, 3, 1);
            let ctx = AlertContext::new(2, window, today);
            let expiry = today + chrono::Duration::days(offset);

            let flags = classify(expiry, 5, &ctx);
            let in_window = offset > 0 && offset <= i64::from(window);
            prop_assert_eq!(flags.expiring_soon, in_window);
        }
    }
}
