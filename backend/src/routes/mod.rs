//! Route definitions for the Inventory Reporting Dashboard

use axum::{
    routing::{get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Raw table views (Data tab)
        .route("/tables/:name", get(handlers::get_table))
        // Derived reports (Visualization tab)
        .nest("/reports", report_routes())
        // Spreadsheet sync
        .route("/sync", post(handlers::run_sync))
}

fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/stock", get(handlers::get_stock_report))
        .route("/low-stock", get(handlers::get_low_stock))
        .route("/top-sellers", get(handlers::get_top_sellers))
        .route("/sales-over-time", get(handlers::get_sales_over_time))
        .route("/purchases-over-time", get(handlers::get_purchases_over_time))
        .route("/stock-by-product", get(handlers::get_stock_by_product))
        .route("/dashboard", get(handlers::get_dashboard))
}
