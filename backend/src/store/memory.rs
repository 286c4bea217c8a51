//! In-memory inventory store
//!
//! Same insert-or-update contract as [`PgStore`](super::PgStore), keyed by
//! primary key in ordered maps. Used by the integration tests.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use shared::{InventorySnapshot, Keyed, Product, PurchaseRecord, SaleRecord};
use tokio::sync::RwLock;

use super::{InventoryStore, Table};
use crate::error::{AppError, AppResult};

/// Full contents of a [`MemoryStore`], ordered by primary key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub products: Vec<Product>,
    pub inventory: Vec<InventorySnapshot>,
    pub sales: Vec<SaleRecord>,
    pub purchases: Vec<PurchaseRecord>,
}

#[derive(Default)]
struct Tables {
    products: BTreeMap<String, Product>,
    inventory: BTreeMap<String, InventorySnapshot>,
    sales: BTreeMap<String, SaleRecord>,
    purchases: BTreeMap<String, PurchaseRecord>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failing: HashSet<Table>,
}

fn upsert<T: Keyed + Clone>(table: &mut BTreeMap<String, T>, rows: &[T]) -> u64 {
    for row in rows {
        table.insert(row.key().to_string(), row.clone());
    }
    rows.len() as u64
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every upsert into `table` fail, to exercise partial sync failures
    pub fn with_failing_table(mut self, table: Table) -> Self {
        self.failing.insert(table);
        self
    }

    pub async fn snapshot(&self) -> StoreSnapshot {
        let tables = self.tables.read().await;
        StoreSnapshot {
            products: tables.products.values().cloned().collect(),
            inventory: tables.inventory.values().cloned().collect(),
            sales: tables.sales.values().cloned().collect(),
            purchases: tables.purchases.values().cloned().collect(),
        }
    }

    fn check_writable(&self, table: Table) -> AppResult<()> {
        if self.failing.contains(&table) {
            return Err(AppError::Upsert {
                table: table.to_string(),
                message: "table is not writable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }

    async fn fetch_products(&self) -> AppResult<Vec<Product>> {
        Ok(self.tables.read().await.products.values().cloned().collect())
    }

    async fn fetch_inventory(&self) -> AppResult<Vec<InventorySnapshot>> {
        Ok(self.tables.read().await.inventory.values().cloned().collect())
    }

    async fn fetch_sales(&self) -> AppResult<Vec<SaleRecord>> {
        Ok(self.tables.read().await.sales.values().cloned().collect())
    }

    async fn fetch_purchases(&self) -> AppResult<Vec<PurchaseRecord>> {
        Ok(self.tables.read().await.purchases.values().cloned().collect())
    }

    async fn upsert_products(&self, rows: &[Product]) -> AppResult<u64> {
        self.check_writable(Table::Products)?;
        Ok(upsert(&mut self.tables.write().await.products, rows))
    }

    async fn upsert_inventory(&self, rows: &[InventorySnapshot]) -> AppResult<u64> {
        self.check_writable(Table::Inventory)?;
        Ok(upsert(&mut self.tables.write().await.inventory, rows))
    }

    async fn upsert_sales(&self, rows: &[SaleRecord]) -> AppResult<u64> {
        self.check_writable(Table::Sales)?;
        Ok(upsert(&mut self.tables.write().await.sales, rows))
    }

    async fn upsert_purchases(&self, rows: &[PurchaseRecord]) -> AppResult<u64> {
        self.check_writable(Table::Purchases)?;
        Ok(upsert(&mut self.tables.write().await.purchases, rows))
    }
}
