//! Business logic services for the PharmaStock backend

pub mod alerts;
pub mod auth;
pub mod batch;
pub mod dashboard;
pub mod medicine;
pub mod receipt;
pub mod search;
pub mod settings;
pub mod stock_issue;
pub mod supplier;

pub use alerts::AlertsService;
pub use auth::AuthService;
pub use batch::BatchService;
pub use dashboard::DashboardService;
pub use medicine::MedicineService;
pub use receipt::ReceiptService;
pub use search::SearchService;
pub use settings::SettingsService;
pub use stock_issue::StockIssueService;
pub use supplier::SupplierService;

/// Escape LIKE wildcards so user input matches literally as a substring.
pub(crate) fn like_pattern(value: &str) -> String {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
