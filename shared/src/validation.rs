//! Validation utilities for stock quantities, prices and thresholds

use rust_decimal::Decimal;

/// Quantities are whole boxes, one or more. Partial boxes do not exist.
pub fn validate_quantity_boxes(quantity: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least one box");
    }
    Ok(())
}

/// Prices are non-negative; zero is allowed for free samples.
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price < Decimal::ZERO {
        return Err("Price cannot be negative");
    }
    Ok(())
}

/// Threshold settings are non-negative counts.
pub fn validate_threshold(value: i32) -> Result<(), &'static str> {
    if value < 0 {
        return Err("Threshold cannot be negative");
    }
    Ok(())
}

/// Identity text fields must not be blank once trimmed.
pub fn validate_identity_field(value: &str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err("Field cannot be empty");
    }
    Ok(())
}
