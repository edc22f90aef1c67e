//! Batch stock types: the ledger identity and FEFO eligibility

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The 4-tuple that uniquely names one lot of stock.
///
/// Two receipt lines with the same identity land on the same ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchIdentity {
    pub medicine_id: Uuid,
    pub pack: String,
    pub batch_no: String,
    pub expiry_date: NaiveDate,
}

/// Whether a batch may be offered for issue.
///
/// Batches expiring on or before today are excluded entirely, as are
/// batches with nothing left to issue.
pub fn fefo_eligible(expiry_date: NaiveDate, available_boxes: i32, today: NaiveDate) -> bool {
    expiry_date > today && available_boxes > 0
}
