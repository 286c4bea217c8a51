//! HTTP handlers for the Inventory Dashboard

pub mod health;
pub mod reporting;
pub mod sync;
pub mod tables;

pub use health::health_check;
pub use reporting::{
    get_dashboard, get_low_stock, get_purchases_over_time, get_sales_over_time,
    get_stock_by_product, get_stock_report, get_top_sellers,
};
pub use sync::run_sync;
pub use tables::get_table;
