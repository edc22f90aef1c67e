//! Stock issue rules that need no store access

use chrono::NaiveDate;

/// An issue may not be dated before the calendar day of the first receipt
/// that ever contributed to the batch identity. Without receipt history
/// the check is skipped.
pub fn issue_date_allowed(issued_date: NaiveDate, first_receipt_date: Option<NaiveDate>) -> bool {
    match first_receipt_date {
        Some(first) => issued_date >= first,
        None => true,
    }
}
