//! Purchase receipt types and the line aggregation applied at ingestion

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::batch::BatchIdentity;

/// Payment mode recorded on a receipt header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMode {
    Cash,
    Credit,
    Bank,
    Other,
}

impl PaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::Cash => "CASH",
            PaymentMode::Credit => "CREDIT",
            PaymentMode::Bank => "BANK",
            PaymentMode::Other => "OTHER",
        }
    }
}

/// Kind of receipt. Only normal purchases mutate the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReceiptType {
    NormalPurchase,
    ReturnCredit,
}

impl ReceiptType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReceiptType::NormalPurchase => "NORMAL_PURCHASE",
            ReceiptType::ReturnCredit => "RETURN_CREDIT",
        }
    }
}

/// One submitted receipt line, pre-aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub identity: BatchIdentity,
    pub quantity_boxes: i32,
    pub purchase_price: Decimal,
    pub mrp: Decimal,
}

/// Group submitted lines by batch identity, preserving first-seen order.
///
/// Quantities sum; the price snapshot is taken from the last line with
/// that identity in submission order.
pub fn aggregate_lines(lines: &[ReceiptLine]) -> Vec<ReceiptLine> {
    let mut grouped: Vec<ReceiptLine> = Vec::new();
    let mut index: HashMap<BatchIdentity, usize> = HashMap::new();

    for line in lines {
        match index.get(&line.identity) {
            Some(&at) => {
                let existing = &mut grouped[at];
                existing.quantity_boxes += line.quantity_boxes;
                existing.purchase_price = line.purchase_price;
                existing.mrp = line.mrp;
            }
            None => {
                index.insert(line.identity.clone(), grouped.len());
                grouped.push(line.clone());
            }
        }
    }

    grouped
}
