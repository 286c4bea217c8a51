//! WebAssembly module for the Inventory Reporting Dashboard
//!
//! Lets the browser dashboard recompute the stock position and the
//! top-sellers ranking from table JSON it already holds, using the same
//! functions as the backend.

use serde::Deserialize;
use wasm_bindgen::prelude::*;

pub use shared::models::*;
pub use shared::reconciliation::*;

/// The four tables as the dashboard receives them from `/tables/*`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TablesInput {
    products: Vec<Product>,
    inventory: Vec<InventorySnapshot>,
    sales: Vec<SaleRecord>,
    purchases: Vec<PurchaseRecord>,
}

fn parse_tables(tables_json: &str) -> Result<TablesInput, String> {
    serde_json::from_str(tables_json).map_err(|e| format!("Invalid tables JSON: {}", e))
}

fn reconcile_tables(tables_json: &str, policy: Option<&str>) -> Result<StockReport, String> {
    let tables = parse_tables(tables_json)?;
    let policy = match policy {
        Some(p) if !p.is_empty() => p.parse::<StockPolicy>()?,
        _ => StockPolicy::default(),
    };

    Ok(reconcile_stock_with(
        policy,
        &tables.products,
        &tables.inventory,
        &tables.sales,
        &tables.purchases,
    ))
}

#[cfg(target_arch = "wasm32")]
fn warn_integrity(report: &StockReport) {
    for orphan in &report.orphans {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "{} record {} references unknown product {}",
            orphan.kind, orphan.record_id, orphan.product_id
        )));
    }
    for issue in &report.issues {
        web_sys::console::warn_1(&JsValue::from_str(&issue.message));
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn warn_integrity(_report: &StockReport) {}

/// Reconcile stock from `{products, inventory, sales, purchases}` JSON.
/// `policy` is one of `snapshot_plus_ledger` (default), `ledger_only`,
/// `snapshot_only`. Returns the stock report as JSON.
#[wasm_bindgen]
pub fn reconcile_stock_json(tables_json: &str, policy: Option<String>) -> Result<String, JsValue> {
    let report = reconcile_tables(tables_json, policy.as_deref()).map_err(|e| JsValue::from_str(&e))?;
    warn_integrity(&report);
    serde_json::to_string(&report).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Top `k` products by quantity sold, as JSON
#[wasm_bindgen]
pub fn top_selling_json(tables_json: &str, k: usize) -> Result<String, JsValue> {
    let tables = parse_tables(tables_json).map_err(|e| JsValue::from_str(&e))?;
    let ranking = top_selling(&tables.products, &tables.sales, k);
    serde_json::to_string(&ranking).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// "Low" or "Sufficient"
#[wasm_bindgen]
pub fn classify_stock(updated_stock: i64, reorder_point: i64) -> String {
    StockStatus::classify(updated_stock, reorder_point).to_string()
}
