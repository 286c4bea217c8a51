//! Reporting service for the dashboard
//! Loads the four inventory tables and derives stock position, top sellers
//! and the time series behind the visualization tab

use std::sync::Arc;

use serde::Serialize;
use shared::{
    InventorySnapshot, Product, ProductStock, PurchaseRecord, QuantityPoint, ReconciledStockRow,
    SaleRecord, StockPolicy, StockReport, TopSeller,
};

use crate::error::{AppError, AppResult};
use crate::store::InventoryStore;

/// Reporting service
#[derive(Clone)]
pub struct ReportingService {
    store: Arc<dyn InventoryStore>,
}

/// The four raw tables, read fresh for each report
#[derive(Debug, Clone, Serialize)]
pub struct InventoryTables {
    pub products: Vec<Product>,
    pub inventory: Vec<InventorySnapshot>,
    pub sales: Vec<SaleRecord>,
    pub purchases: Vec<PurchaseRecord>,
}

/// Everything the visualization tab renders
#[derive(Debug, Serialize)]
pub struct DashboardReport {
    pub stock: StockReport,
    pub top_sellers: Vec<TopSeller>,
    pub sales_over_time: Vec<QuantityPoint>,
    pub purchases_over_time: Vec<QuantityPoint>,
    pub stock_by_product: Vec<ProductStock>,
    pub product_count: usize,
    pub sale_count: usize,
    pub purchase_count: usize,
}

/// Report filter parameters
#[derive(Debug)]
pub struct ReportFilter {
    pub policy: StockPolicy,
    pub range: shared::DateRange,
    pub top_n: usize,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            policy: StockPolicy::default(),
            range: shared::DateRange::default(),
            top_n: shared::DEFAULT_TOP_N,
        }
    }
}

impl ReportingService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    /// Read all four tables
    pub async fn load_tables(&self) -> AppResult<InventoryTables> {
        Ok(InventoryTables {
            products: self.store.fetch_products().await?,
            inventory: self.store.fetch_inventory().await?,
            sales: self.store.fetch_sales().await?,
            purchases: self.store.fetch_purchases().await?,
        })
    }

    /// Reconcile ledgers against the inventory baseline
    pub async fn get_stock_report(&self, policy: StockPolicy) -> AppResult<StockReport> {
        let tables = self.load_tables().await?;
        Ok(Self::stock_report(&tables, policy))
    }

    /// Products whose updated stock is below their reorder point
    pub async fn get_low_stock(&self, policy: StockPolicy) -> AppResult<Vec<ReconciledStockRow>> {
        let report = self.get_stock_report(policy).await?;
        Ok(report.low_stock().cloned().collect())
    }

    /// Best-selling products by total quantity
    pub async fn get_top_sellers(&self, limit: usize) -> AppResult<Vec<TopSeller>> {
        let products = self.store.fetch_products().await?;
        let sales = self.store.fetch_sales().await?;
        Ok(shared::top_selling(&products, &sales, limit))
    }

    pub async fn get_sales_over_time(&self, range: &shared::DateRange) -> AppResult<Vec<QuantityPoint>> {
        let sales = self.store.fetch_sales().await?;
        Ok(shared::sales_over_time(&sales, range))
    }

    pub async fn get_purchases_over_time(
        &self,
        range: &shared::DateRange,
    ) -> AppResult<Vec<QuantityPoint>> {
        let purchases = self.store.fetch_purchases().await?;
        Ok(shared::purchases_over_time(&purchases, range))
    }

    /// Raw snapshot stock per inventory row with product names
    pub async fn get_stock_by_product(&self) -> AppResult<Vec<ProductStock>> {
        let products = self.store.fetch_products().await?;
        let inventory = self.store.fetch_inventory().await?;
        Ok(shared::stock_by_product(&products, &inventory))
    }

    /// Get dashboard data from a single read of the tables
    pub async fn get_dashboard(&self, filter: &ReportFilter) -> AppResult<DashboardReport> {
        let tables = self.load_tables().await?;

        Ok(DashboardReport {
            stock: Self::stock_report(&tables, filter.policy),
            top_sellers: shared::top_selling(&tables.products, &tables.sales, filter.top_n),
            sales_over_time: shared::sales_over_time(&tables.sales, &filter.range),
            purchases_over_time: shared::purchases_over_time(&tables.purchases, &filter.range),
            stock_by_product: shared::stock_by_product(&tables.products, &tables.inventory),
            product_count: tables.products.len(),
            sale_count: tables.sales.len(),
            purchase_count: tables.purchases.len(),
        })
    }

    fn stock_report(tables: &InventoryTables, policy: StockPolicy) -> StockReport {
        let report = shared::reconcile_stock_with(
            policy,
            &tables.products,
            &tables.inventory,
            &tables.sales,
            &tables.purchases,
        );

        for orphan in &report.orphans {
            tracing::warn!(
                "{} record {} references unknown product {}; excluded from stock report",
                orphan.kind,
                orphan.record_id,
                orphan.product_id
            );
        }
        for issue in &report.issues {
            tracing::warn!("Integrity issue ({:?}): {}", issue.kind, issue.message);
        }
        if !report.orphans.is_empty() {
            tracing::warn!("{} orphaned records excluded", report.orphans.len());
        }
        tracing::debug!(
            "Stock report ({}): {} products, {} low",
            policy,
            report.rows.len(),
            report.low_count
        );

        report
    }

    /// Export report data as CSV
    pub fn export_to_csv<T: Serialize>(data: &[T]) -> AppResult<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        for record in data {
            wtr.serialize(record)
                .map_err(|e| AppError::Internal(format!("CSV serialization error: {}", e)))?;
        }
        let csv_data = String::from_utf8(
            wtr.into_inner()
                .map_err(|e| AppError::Internal(format!("CSV writer error: {}", e)))?,
        )
        .map_err(|e| AppError::Internal(format!("UTF-8 conversion error: {}", e)))?;
        Ok(csv_data)
    }
}
