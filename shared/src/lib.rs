//! Shared types and pure stock logic for the PharmaStock platform
//!
//! This crate contains types shared between the backend and other
//! components of the system, plus the store-independent pieces of the
//! batch ledger: receipt line aggregation, alert classification, FEFO
//! eligibility and the issue-date rule.

pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
