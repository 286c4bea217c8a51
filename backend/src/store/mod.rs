//! Storage for the four inventory tables
//!
//! Reports read whole tables; the sync job writes them with one batch
//! upsert per table. Each upsert call is its own unit of work.

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;
use shared::{InventorySnapshot, Product, PurchaseRecord, SaleRecord};

use crate::error::AppResult;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Destination tables, in sync order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Products,
    Inventory,
    Sales,
    Purchases,
}

impl Table {
    pub const ALL: [Table; 4] = [Table::Products, Table::Inventory, Table::Sales, Table::Purchases];

    /// Table name, also the sheet name it is synced from
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Products => "products",
            Table::Inventory => "inventory",
            Table::Sales => "sales",
            Table::Purchases => "purchases",
        }
    }

    pub fn primary_key(&self) -> &'static str {
        match self {
            Table::Products => "product_id",
            Table::Inventory => "inventory_id",
            Table::Sales => "sale_id",
            Table::Purchases => "purchase_id",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Table::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read and insert-or-update access to the inventory tables
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Check connectivity
    async fn ping(&self) -> AppResult<()>;

    async fn fetch_products(&self) -> AppResult<Vec<Product>>;

    async fn fetch_inventory(&self) -> AppResult<Vec<InventorySnapshot>>;

    async fn fetch_sales(&self) -> AppResult<Vec<SaleRecord>>;

    async fn fetch_purchases(&self) -> AppResult<Vec<PurchaseRecord>>;

    /// Insert or update by `product_id`; returns rows written
    async fn upsert_products(&self, rows: &[Product]) -> AppResult<u64>;

    /// Insert or update by `inventory_id`
    async fn upsert_inventory(&self, rows: &[InventorySnapshot]) -> AppResult<u64>;

    /// Insert or update by `sale_id`
    async fn upsert_sales(&self, rows: &[SaleRecord]) -> AppResult<u64>;

    /// Insert or update by `purchase_id`
    async fn upsert_purchases(&self, rows: &[PurchaseRecord]) -> AppResult<u64>;
}
