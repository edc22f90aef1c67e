//! Stock issue tests
//!
//! Tests for FEFO selection, the issue-date guard and the guarded
//! decrement semantics that keep the ledger non-negative.

use chrono::NaiveDate;
use proptest::prelude::*;
use uuid::Uuid;

use shared::models::{fefo_eligible, issue_date_allowed};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// The same conditional write the ledger performs: decrement only when
/// the balance still covers the request.
fn guarded_decrement(balance: i32, issued_boxes: i32) -> Option<i32> {
    if balance >= issued_boxes {
        Some(balance - issued_boxes)
    } else {
        None
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_fefo_eligibility() {
        let today = date(2026, 3, 1);

        // expired today or earlier is never eligible
        assert!(!fefo_eligible(date(2026, 3, 1), 10, today));
        assert!(!fefo_eligible(date(2026, 2, 1), 10, today));
        // no stock left is never eligible
        assert!(!fefo_eligible(date(2026, 6, 1), 0, today));
        // future expiry with stock is eligible
        assert!(fefo_eligible(date(2026, 3, 2), 1, today));
    }

    #[test]
    fn test_fefo_ordering_picks_earliest_expiry() {
        let today = date(2026, 3, 1);

        let mut batches = vec![
            (date(2026, 6, 29), "B120", Uuid::new_v4(), 5),
            (date(2026, 3, 6), "B5", Uuid::new_v4(), 5),
            (date(2026, 3, 21), "B20", Uuid::new_v4(), 5),
            (date(2026, 2, 1), "BEXP", Uuid::new_v4(), 5),
        ];

        batches.retain(|(expiry, _, _, boxes)| fefo_eligible(*expiry, *boxes, today));
        batches.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        let order: Vec<&str> = batches.iter().map(|(_, no, _, _)| *no).collect();
        assert_eq!(order, vec!["B5", "B20", "B120"]);
        assert!(!order.contains(&"BEXP"));
    }

    #[test]
    fn test_fefo_tie_breaks_on_batch_no() {
        let today = date(2026, 3, 1);
        let expiry = date(2026, 5, 1);

        let mut batches = vec![
            (expiry, "B2", Uuid::new_v4()),
            (expiry, "B1", Uuid::new_v4()),
        ];
        batches.sort_by(|a, b| (a.0, a.1, a.2).cmp(&(b.0, b.1, b.2)));

        assert_eq!(batches[0].1, "B1");
    }

    #[test]
    fn test_issue_date_guard() {
        let first_receipt = Some(date(2026, 2, 18));

        assert!(!issue_date_allowed(date(2026, 2, 1), first_receipt));
        assert!(issue_date_allowed(date(2026, 2, 18), first_receipt));
        assert!(issue_date_allowed(date(2026, 2, 19), first_receipt));
    }

    #[test]
    fn test_issue_date_guard_without_history() {
        assert!(issue_date_allowed(date(2020, 1, 1), None));
    }

    #[test]
    fn test_guarded_decrement_race() {
        // two issuers of 6 boxes each against a balance of 10
        let first = guarded_decrement(10, 6);
        assert_eq!(first, Some(4));

        let second = guarded_decrement(first.unwrap(), 6);
        assert_eq!(second, None);
    }

    #[test]
    fn test_guarded_decrement_exact_balance() {
        assert_eq!(guarded_decrement(6, 6), Some(0));
        assert_eq!(guarded_decrement(5, 6), None);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn boxes_strategy() -> impl Strategy<Value = i32> {
        1i32..50
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Any interleaving of guarded decrements keeps the balance
        /// non-negative, and the balance accounts for exactly the
        /// successful issues.
        #[test]
        fn prop_guarded_decrements_never_go_negative(
            initial in 0i32..200,
            requests in prop::collection::vec(boxes_strategy(), 0..30),
        ) {
            let mut balance = initial;
            let mut issued = 0i32;

            for request in requests {
                if let Some(next) = guarded_decrement(balance, request) {
                    balance = next;
                    issued += request;
                }
                prop_assert!(balance >= 0);
            }

            prop_assert_eq!(balance, initial - issued);
        }

        /// Competing issues only both succeed when the balance covers
        /// their combined quantity.
        #[test]
        fn prop_concurrent_issues_bounded_by_balance(
            initial in 0i32..100,
            a in boxes_strategy(),
            b in boxes_strategy(),
        ) {
            let first = guarded_decrement(initial, a);
            let both = first.and_then(|rest| guarded_decrement(rest, b));

            if both.is_some() {
                prop_assert!(a + b <= initial);
            }
            if a + b <= initial {
                prop_assert!(both.is_some());
            }
        }

        /// Eligibility is monotonic in stock and strict in expiry.
        #[test]
        fn prop_fefo_eligibility(
            offset in -200i64..200,
            boxes in 0i32..100,
        ) {
            let today = date(2026, 3, 1);
            let expiry = today + chrono::Duration::days(offset);

            let eligible = fefo_eligible(expiry, boxes, today);
            prop_assert_eq!(eligible, offset > 0 && boxes > 0);
        }

        /// An issue dated on or after the first receipt always passes.
        #[test]
        fn prop_issue_date_guard(
            first_offset in 0i64..400,
            issue_offset in 0i64..400,
        ) {
            let base = date(2026, 1, 1);
            let first = base + chrono::Duration::days(first_offset);
            let issued = base + chrono::Duration::days(issue_offset);

            let allowed = issue_date_allowed(issued, Some(first));
            prop_assert_eq!(allowed, issued >= first);
        }
    }
}
