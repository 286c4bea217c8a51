//! PostgreSQL-backed inventory store
//!
//! Upserts bind each column as an array and insert through `UNNEST`, so a
//! whole sheet is written by a single statement inside its own transaction.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use shared::{InventorySnapshot, Keyed, Product, PurchaseRecord, SaleRecord};
use sqlx::{postgres::PgDatabaseError, FromRow, PgPool};

use super::{InventoryStore, Table};
use crate::error::{AppError, AppResult};

/// Inventory store over a Postgres pool owned by the caller
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

#[derive(Debug, FromRow)]
struct ProductRow {
    product_id: String,
    product_name: String,
    category: String,
    supplier: String,
    reorder_point: i64,
    target_stock_level: i64,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Product {
            product_id: r.product_id,
            product_name: r.product_name,
            category: r.category,
            supplier: r.supplier,
            reorder_point: r.reorder_point,
            target_stock_level: r.target_stock_level,
        }
    }
}

#[derive(Debug, FromRow)]
struct InventoryRow {
    inventory_id: String,
    product_id: String,
    stock_on_hand: i64,
    warehouse_location: String,
    last_updated: NaiveDateTime,
}

impl From<InventoryRow> for InventorySnapshot {
    fn from(r: InventoryRow) -> Self {
        InventorySnapshot {
            inventory_id: r.inventory_id,
            product_id: r.product_id,
            stock_on_hand: r.stock_on_hand,
            warehouse_location: r.warehouse_location,
            last_updated: r.last_updated,
        }
    }
}

#[derive(Debug, FromRow)]
struct SaleRow {
    sale_id: String,
    product_id: String,
    sale_date: NaiveDate,
    quantity_sold: i64,
}

impl From<SaleRow> for SaleRecord {
    fn from(r: SaleRow) -> Self {
        SaleRecord {
            sale_id: r.sale_id,
            product_id: r.product_id,
            sale_date: r.sale_date,
            quantity_sold: r.quantity_sold,
        }
    }
}

#[derive(Debug, FromRow)]
struct PurchaseRow {
    purchase_id: String,
    product_id: String,
    purchase_date: NaiveDate,
    quantity_purchased: i64,
    lead_time_days: i64,
}

impl From<PurchaseRow> for PurchaseRecord {
    fn from(r: PurchaseRow) -> Self {
        PurchaseRecord {
            purchase_id: r.purchase_id,
            product_id: r.product_id,
            purchase_date: r.purchase_date,
            quantity_purchased: r.quantity_purchased,
            lead_time_days: r.lead_time_days,
        }
    }
}

fn primary_keys<T: Keyed>(rows: &[T]) -> Vec<String> {
    rows.iter().map(|r| r.key().to_string()).collect()
}

fn upsert_error(table: Table, keys: &[String], err: sqlx::Error) -> AppError {
    let db_error = err.as_database_error();
    let constraint = db_error.and_then(|d| d.constraint());
    let detail = db_error
        .and_then(|d| d.try_downcast_ref::<PgDatabaseError>())
        .and_then(|d| d.detail());

    let message = upsert_context(keys, constraint, detail, &err.to_string());
    tracing::error!("Upsert into {} failed: {}", table, message);
    AppError::Upsert {
        table: table.to_string(),
        message,
    }
}

/// Error text for a failed batch. Postgres names the offending key in
/// `detail` when a constraint fires; the batch key range is always added.
fn upsert_context(
    keys: &[String],
    constraint: Option<&str>,
    detail: Option<&str>,
    cause: &str,
) -> String {
    let mut message = cause.to_string();
    if let Some(constraint) = constraint {
        message.push_str(&format!(" (constraint {})", constraint));
    }
    if let Some(detail) = detail {
        message.push_str(&format!(": {}", detail));
    }
    if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
        message.push_str(&format!(
            " [batch of {} rows, keys {}..{}]",
            keys.len(),
            first,
            last
        ));
    }
    message
}

impl PgStore {
    /// Create a new PgStore instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.db).await?;
        Ok(())
    }

    async fn fetch_products(&self) -> AppResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT product_id, product_name, category, supplier, reorder_point, target_stock_level
            FROM products
            ORDER BY product_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn fetch_inventory(&self) -> AppResult<Vec<InventorySnapshot>> {
        let rows = sqlx::query_as::<_, InventoryRow>(
            r#"
            SELECT inventory_id, product_id, stock_on_hand, warehouse_location, last_updated
            FROM inventory
            ORDER BY inventory_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(InventorySnapshot::from).collect())
    }

    async fn fetch_sales(&self) -> AppResult<Vec<SaleRecord>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT sale_id, product_id, sale_date, quantity_sold FROM sales ORDER BY sale_id",
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SaleRecord::from).collect())
    }

    async fn fetch_purchases(&self) -> AppResult<Vec<PurchaseRecord>> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            r#"
            SELECT purchase_id, product_id, purchase_date, quantity_purchased, lead_time_days
            FROM purchases
            ORDER BY purchase_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(PurchaseRecord::from).collect())
    }

    async fn upsert_products(&self, rows: &[Product]) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let keys = primary_keys(rows);
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO products (product_id, product_name, category, supplier, reorder_point, target_stock_level)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::bigint[], $6::bigint[])
            ON CONFLICT (product_id) DO UPDATE SET
                product_name = EXCLUDED.product_name,
                category = EXCLUDED.category,
                supplier = EXCLUDED.supplier,
                reorder_point = EXCLUDED.reorder_point,
                target_stock_level = EXCLUDED.target_stock_level
            "#,
        )
        .bind(&keys[..])
        .bind(rows.iter().map(|r| r.product_name.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.category.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.supplier.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.reorder_point).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.target_stock_level).collect::<Vec<_>>())
        .execute(&mut *tx)
        .await
        .map_err(|e| upsert_error(Table::Products, &keys, e))?;
        tx.commit().await.map_err(|e| upsert_error(Table::Products, &keys, e))?;

        Ok(result.rows_affected())
    }

    async fn upsert_inventory(&self, rows: &[InventorySnapshot]) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let keys = primary_keys(rows);
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO inventory (inventory_id, product_id, stock_on_hand, warehouse_location, last_updated)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::bigint[], $4::text[], $5::timestamp[])
            ON CONFLICT (inventory_id) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                stock_on_hand = EXCLUDED.stock_on_hand,
                warehouse_location = EXCLUDED.warehouse_location,
                last_updated = EXCLUDED.last_updated
            "#,
        )
        .bind(&keys[..])
        .bind(rows.iter().map(|r| r.product_id.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.stock_on_hand).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.warehouse_location.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.last_updated).collect::<Vec<_>>())
        .execute(&mut *tx)
        .await
        .map_err(|e| upsert_error(Table::Inventory, &keys, e))?;
        tx.commit().await.map_err(|e| upsert_error(Table::Inventory, &keys, e))?;

        Ok(result.rows_affected())
    }

    async fn upsert_sales(&self, rows: &[SaleRecord]) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let keys = primary_keys(rows);
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO sales (sale_id, product_id, sale_date, quantity_sold)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::date[], $4::bigint[])
            ON CONFLICT (sale_id) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                sale_date = EXCLUDED.sale_date,
                quantity_sold = EXCLUDED.quantity_sold
            "#,
        )
        .bind(&keys[..])
        .bind(rows.iter().map(|r| r.product_id.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.sale_date).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.quantity_sold).collect::<Vec<_>>())
        .execute(&mut *tx)
        .await
        .map_err(|e| upsert_error(Table::Sales, &keys, e))?;
        tx.commit().await.map_err(|e| upsert_error(Table::Sales, &keys, e))?;

        Ok(result.rows_affected())
    }

    async fn upsert_purchases(&self, rows: &[PurchaseRecord]) -> AppResult<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let keys = primary_keys(rows);
        let mut tx = self.db.begin().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO purchases (purchase_id, product_id, purchase_date, quantity_purchased, lead_time_days)
            SELECT * FROM UNNEST($1::text[], $2::text[], $3::date[], $4::bigint[], $5::bigint[])
            ON CONFLICT (purchase_id) DO UPDATE SET
                product_id = EXCLUDED.product_id,
                purchase_date = EXCLUDED.purchase_date,
                quantity_purchased = EXCLUDED.quantity_purchased,
                lead_time_days = EXCLUDED.lead_time_days
            "#,
        )
        .bind(&keys[..])
        .bind(rows.iter().map(|r| r.product_id.clone()).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.purchase_date).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.quantity_purchased).collect::<Vec<_>>())
        .bind(rows.iter().map(|r| r.lead_time_days).collect::<Vec<_>>())
        .execute(&mut *tx)
        .await
        .map_err(|e| upsert_error(Table::Purchases, &keys, e))?;
        tx.commit().await.map_err(|e| upsert_error(Table::Purchases, &keys, e))?;

        Ok(result.rows_affected())
    }
}
