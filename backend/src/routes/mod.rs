//! Route definitions for the PharmaStock backend

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Auth routes (login public, profile protected)
        .nest("/auth", auth_routes())
        // Protected routes - threshold settings
        .nest("/settings", settings_routes())
        // Protected routes - master data
        .nest("/medicines", medicine_routes())
        .nest("/suppliers", supplier_routes())
        // Protected routes - receipt ingestion and history
        .nest("/purchase-receipts", receipt_routes())
        // Protected routes - batch ledger
        .nest("/batches", batch_routes())
        // Protected routes - stock issues and FEFO
        .nest("/stock-issues", stock_issue_routes())
        // Protected routes - dashboard
        .nest("/dashboard", dashboard_routes())
        // Protected routes - alert listings
        .nest("/alerts", alert_routes())
        // Protected routes - search
        .merge(search_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    let protected = Router::new()
        .route("/me", get(handlers::me))
        .route_layer(middleware::from_fn(auth_middleware));

    Router::new()
        .route("/login", post(handlers::login))
        .merge(protected)
}

/// Threshold settings routes (protected)
fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::get_settings).patch(handlers::patch_settings),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Medicine master data routes (protected)
fn medicine_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_medicines).post(handlers::create_medicine),
        )
        .route(
            "/:medicine_id",
            get(handlers::get_medicine).put(handlers::update_medicine),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Supplier master data routes (protected)
fn supplier_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_suppliers).post(handlers::create_supplier),
        )
        .route(
            "/:supplier_id",
            get(handlers::get_supplier).put(handlers::update_supplier),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Purchase receipt routes (protected)
fn receipt_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_receipts).post(handlers::create_receipt),
        )
        .route("/:receipt_id", get(handlers::get_receipt_detail))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Batch ledger routes (protected)
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches))
        .route("/lookup", get(handlers::lookup_batch))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Stock issue routes (protected)
fn stock_issue_routes() -> Router<AppState> {
    Router::new()
        .route("/fefo-suggest", get(handlers::fefo_suggest))
        .route(
            "/",
            get(handlers::list_stock_issues).post(handlers::create_stock_issue),
        )
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Dashboard routes (protected)
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/summary", get(handlers::get_dashboard_summary))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Alert listing routes (protected)
fn alert_routes() -> Router<AppState> {
    Router::new()
        .route("/expiring-soon", get(handlers::list_expiring_soon_alerts))
        .route("/expired", get(handlers::list_expired_alerts))
        .route("/low-stock", get(handlers::list_low_stock_alerts))
        .route("/out-of-stock", get(handlers::list_out_of_stock_alerts))
        .route_layer(middleware::from_fn(auth_middleware))
}

/// Search routes (protected)
fn search_routes() -> Router<AppState> {
    Router::new()
        .route("/receipt-search", get(handlers::receipt_search))
        .route("/price-history", get(handlers::price_history))
        .route_layer(middleware::from_fn(auth_middleware))
}
