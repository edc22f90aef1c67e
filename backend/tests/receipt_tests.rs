//! Receipt ingestion tests
//!
//! Tests for the pure half of ingestion:
//! - Identity aggregation with last-line-wins price snapshots
//! - Order preservation across aggregation
//! - Quantity conservation

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use uuid::Uuid;

use shared::models::{aggregate_lines, BatchIdentity, ReceiptLine};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn line(
    medicine_id: Uuid,
    batch_no: &str,
    quantity_boxes: i32,
    purchase_price: Decimal,
    mrp: Decimal,
) -> ReceiptLine {
    ReceiptLine {
        identity: BatchIdentity {
            medicine_id,
            pack: "10x10".to_string(),
            batch_no: batch_no.to_string(),
            expiry_date: date(2027, 6, 30),
        },
        quantity_boxes,
        purchase_price,
        mrp,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_repeated_identity_sums_and_last_price_wins() {
        let medicine_id = Uuid::new_v4();
        let lines = vec![
            line(medicine_id, "B1", 8, dec("10.00"), dec("14.00")),
            line(medicine_id, "B1", 4, dec("11.50"), dec("15.00")),
        ];

        let grouped = aggregate_lines(&lines);

        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].quantity_boxes, 12);
        assert_eq!(grouped[0].purchase_price, dec("11.50"));
        assert_eq!(grouped[0].mrp, dec("15.00"));
    }

    #[test]
    fn test_distinct_identities_stay_separate() {
        let medicine_id = Uuid::new_v4();
        let lines = vec![
            line(medicine_id, "B1", 8, dec("10.00"), dec("14.00")),
            line(medicine_id, "B2", 4, dec("9.00"), dec("13.00")),
        ];

        let grouped = aggregate_lines(&lines);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[0].quantity_boxes, 8);
        assert_eq!(grouped[1].quantity_boxes, 4);
    }

    #[test]
    fn test_first_seen_order_preserved() {
        let medicine_id = Uuid::new_v4();
        let lines = vec![
            line(medicine_id, "B3", 1, dec("1.00"), dec("2.00")),
            line(medicine_id, "B1", 1, dec("1.00"), dec("2.00")),
            line(medicine_id, "B3", 1, dec("1.00"), dec("2.00")),
            line(medicine_id, "B2", 1, dec("1.00"), dec("2.00")),
        ];

        let grouped = aggregate_lines(&lines);

        let order: Vec<&str> = grouped.iter().map(|l| l.identity.batch_no.as_str()).collect();
        assert_eq!(order, vec!["B3", "B1", "B2"]);
        assert_eq!(grouped[0].quantity_boxes, 2);
    }

    #[test]
    fn test_differing_expiry_is_a_different_identity() {
        let medicine_id = Uuid::new_v4();
        let mut second = line(medicine_id, "B1", 4, dec("10.00"), dec("14.00"));
        second.identity.expiry_date = date(2028, 1, 31);

        let lines = vec![line(medicine_id, "B1", 8, dec("10.00"), dec("14.00")), second];
        let grouped = aggregate_lines(&lines);

        assert_eq!(grouped.len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate_lines(&[]).is_empty());
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn batch_no_strategy() -> impl Strategy<Value = &'static str> {
        prop_oneof![Just("B1"), Just("B2"), Just("B3"), Just("B4")]
    }

    fn quantity_strategy() -> impl Strategy<Value = i32> {
        1i32..100
    }

    fn price_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..100_000).prop_map(|n| Decimal::new(n, 2))
    }

    fn lines_strategy() -> impl Strategy<Value = Vec<ReceiptLine>> {
        let medicine_id = Uuid::new_v4();
        prop::collection::vec(
            (batch_no_strategy(), quantity_strategy(), price_strategy(), price_strategy())
                .prop_map(move |(batch_no, qty, price, mrp)| {
                    line(medicine_id, batch_no, qty, price, mrp)
                }),
            0..30,
        )
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Aggregation never loses or invents boxes.
        #[test]
        fn prop_quantity_conserved(lines in lines_strategy()) {
            let submitted: i64 = lines.iter().map(|l| i64::from(l.quantity_boxes)).sum();
            let grouped = aggregate_lines(&lines);
            let aggregated: i64 = grouped.iter().map(|l| i64::from(l.quantity_boxes)).sum();

            prop_assert_eq!(submitted, aggregated);
        }

        /// One output group per distinct identity.
        #[test]
        fn prop_one_group_per_identity(lines in lines_strategy()) {
            let grouped = aggregate_lines(&lines);

            let mut identities: Vec<&BatchIdentity> = grouped.iter().map(|l| &l.identity).collect();
            let before = identities.len();
            identities.sort_by(|a, b| {
                (&a.batch_no, a.expiry_date).cmp(&(&b.batch_no, b.expiry_date))
            });
            identities.dedup();

            prop_assert_eq!(before, identities.len());
            prop_assert!(grouped.len() <= lines.len());
        }

        /// Each group carries the price pair of its last submitted line.
        #[test]
        fn prop_last_price_wins(lines in lines_strategy()) {
            let grouped = aggregate_lines(&lines);

            for group in &grouped {
                let last = lines
                    .iter()
                    .rev()
                    .find(|l| l.identity == group.identity)
                    .unwrap();
                prop_assert_eq!(group.purchase_price, last.purchase_price);
                prop_assert_eq!(group.mrp, last.mrp);
            }
        }
    }
}
