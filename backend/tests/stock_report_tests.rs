//! Stock reporting tests
//!
//! Tests for the reconciled stock position including:
//! - Baseline plus ledger arithmetic and the reorder-point boundary
//! - Missing baselines and orphaned ledger records
//! - Top-sellers ranking and daily series

use std::sync::Arc;

use chrono::NaiveDate;
use inventory_dashboard::services::reporting::{ReportFilter, ReportingService};
use inventory_dashboard::store::{InventoryStore, MemoryStore};
use proptest::prelude::*;
use shared::{
    DateRange, InventorySnapshot, Product, PurchaseRecord, SaleRecord, StockPolicy, StockStatus,
};

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn product(id: &str, name: &str, reorder_point: i64) -> Product {
    Product {
        product_id: id.to_string(),
        product_name: name.to_string(),
        category: "Hardware".to_string(),
        supplier: "Acme".to_string(),
        reorder_point,
        target_stock_level: reorder_point * 2,
    }
}

fn snapshot(id: &str, product_id: &str, stock_on_hand: i64) -> InventorySnapshot {
    InventorySnapshot {
        inventory_id: id.to_string(),
        product_id: product_id.to_string(),
        stock_on_hand,
        warehouse_location: "Main".to_string(),
        last_updated: date("2024-01-01").and_hms_opt(8, 0, 0).unwrap(),
    }
}

fn sale(id: &str, product_id: &str, day: &str, quantity: i64) -> SaleRecord {
    SaleRecord {
        sale_id: id.to_string(),
        product_id: product_id.to_string(),
        sale_date: date(day),
        quantity_sold: quantity,
    }
}

fn purchase(id: &str, product_id: &str, day: &str, quantity: i64) -> PurchaseRecord {
    PurchaseRecord {
        purchase_id: id.to_string(),
        product_id: product_id.to_string(),
        purchase_date: date(day),
        quantity_purchased: quantity,
        lead_time_days: 7,
    }
}

/// P1 and P2 from the reference scenario
async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .upsert_products(&[product("P1", "Widget", 40), product("P2", "Gadget", 5)])
        .await
        .unwrap();
    store
        .upsert_inventory(&[snapshot("I1", "P1", 50), snapshot("I2", "P2", 10)])
        .await
        .unwrap();
    store
        .upsert_purchases(&[
            purchase("U1", "P1", "2024-01-02", 20),
            purchase("U2", "P1", "2024-01-05", 10),
        ])
        .await
        .unwrap();
    store
        .upsert_sales(&[
            sale("S1", "P1", "2024-01-02", 15),
            sale("S2", "P1", "2024-01-03", 5),
            sale("S3", "P2", "2024-01-02", 5),
            sale("S4", "P2", "2024-01-04", 8),
        ])
        .await
        .unwrap();
    store
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[tokio::test]
    async fn test_reference_products_reconcile() {
        let service = ReportingService::new(seeded_store().await);
        let report = service.get_stock_report(StockPolicy::default()).await.unwrap();

        let p1 = report.row("P1").unwrap();
        assert_eq!(p1.total_purchased, 30);
        assert_eq!(p1.total_sold, 20);
        assert_eq!(p1.updated_stock, 60);
        assert_eq!(p1.status, StockStatus::Sufficient);

        let p2 = report.row("P2").unwrap();
        assert_eq!(p2.total_purchased, 0);
        assert_eq!(p2.updated_stock, -3);
        assert_eq!(p2.status, StockStatus::Low);

        assert_eq!(report.low_count, 1);
        assert!(report.orphans.is_empty());
    }

    #[tokio::test]
    async fn test_low_stock_lists_only_low_rows() {
        let service = ReportingService::new(seeded_store().await);
        let low = service.get_low_stock(StockPolicy::default()).await.unwrap();

        assert_eq!(low.len(), 1);
        assert_eq!(low[0].product_id, "P2");
    }

    #[tokio::test]
    async fn test_policies_change_updated_stock() {
        let service = ReportingService::new(seeded_store().await);

        let ledger = service.get_stock_report(StockPolicy::LedgerOnly).await.unwrap();
        assert_eq!(ledger.row("P1").unwrap().updated_stock, 10);
        assert_eq!(ledger.policy, StockPolicy::LedgerOnly);

        let snap = service.get_stock_report(StockPolicy::SnapshotOnly).await.unwrap();
        assert_eq!(snap.row("P2").unwrap().updated_stock, 10);
        assert_eq!(snap.row("P2").unwrap().status, StockStatus::Sufficient);
    }

    #[tokio::test]
    async fn test_product_without_snapshot_uses_zero_baseline() {
        let store = seeded_store().await;
        store.upsert_products(&[product("P3", "Sprocket", 1)]).await.unwrap();
        store
            .upsert_purchases(&[purchase("U3", "P3", "2024-01-06", 4)])
            .await
            .unwrap();

        let report = ReportingService::new(store)
            .get_stock_report(StockPolicy::default())
            .await
            .unwrap();
        let p3 = report.row("P3").unwrap();

        assert!(!p3.has_snapshot);
        assert_eq!(p3.stock_on_hand, 0);
        assert_eq!(p3.updated_stock, 4);
        assert_eq!(report.rows.len(), 3);
    }

    #[tokio::test]
    async fn test_orphans_are_excluded_and_reported() {
        let store = seeded_store().await;
        store
            .upsert_sales(&[sale("S9", "GHOST", "2024-01-02", 99)])
            .await
            .unwrap();

        let report = ReportingService::new(store)
            .get_stock_report(StockPolicy::default())
            .await
            .unwrap();

        assert!(report.row("GHOST").is_none());
        assert_eq!(report.row("P1").unwrap().total_sold, 20);
        assert_eq!(report.orphans.len(), 1);
        assert_eq!(report.orphans[0].record_id, "S9");
        assert_eq!(report.orphans[0].product_id, "GHOST");
    }

    #[tokio::test]
    async fn test_top_sellers_breaks_ties_by_product_id() {
        let store = Arc::new(MemoryStore::new());
        store
            .upsert_products(&[
                product("P1", "A", 0),
                product("P2", "B", 0),
                product("P3", "C", 0),
                product("P4", "D", 0),
            ])
            .await
            .unwrap();
        store
            .upsert_sales(&[
                sale("S1", "P1", "2024-01-01", 100),
                sale("S2", "P3", "2024-01-01", 250),
                sale("S3", "P2", "2024-01-01", 200),
                sale("S4", "P2", "2024-01-02", 50),
                sale("S5", "P4", "2024-01-01", 5),
            ])
            .await
            .unwrap();

        let top = ReportingService::new(store).get_top_sellers(2).await.unwrap();
        let ids: Vec<&str> = top.iter().map(|t| t.product_id.as_str()).collect();

        assert_eq!(ids, vec!["P2", "P3"]);
        assert_eq!(top[0].quantity_sold, 250);
        assert_eq!(top[0].product_name, "B");
    }

    #[tokio::test]
    async fn test_sales_over_time_respects_range() {
        let service = ReportingService::new(seeded_store().await);
        let range = DateRange::new(Some(date("2024-01-02")), Some(date("2024-01-03")));
        let points = service.get_sales_over_time(&range).await.unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, date("2024-01-02"));
        assert_eq!(points[0].quantity, 20);
        assert_eq!(points[1].quantity, 5);
    }

    #[tokio::test]
    async fn test_dashboard_combines_reports() {
        let service = ReportingService::new(seeded_store().await);
        let dashboard = service.get_dashboard(&ReportFilter::default()).await.unwrap();

        assert_eq!(dashboard.product_count, 2);
        assert_eq!(dashboard.sale_count, 4);
        assert_eq!(dashboard.purchase_count, 2);
        assert_eq!(dashboard.stock.low_count, 1);
        assert_eq!(dashboard.top_sellers[0].product_id, "P1");
        assert_eq!(dashboard.purchases_over_time.len(), 2);
        assert_eq!(dashboard.stock_by_product.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_store_gives_empty_report() {
        let service = ReportingService::new(Arc::new(MemoryStore::new()));
        let report = service.get_stock_report(StockPolicy::default()).await.unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.low_count, 0);
    }

    #[test]
    fn test_csv_export_has_header_row() {
        let rows = vec![sale("S1", "P1", "2024-01-02", 3)];
        let csv = ReportingService::export_to_csv(&rows).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("sale_id,product_id,sale_date,quantity_sold"));
        assert_eq!(lines.next(), Some("S1,P1,2024-01-02,3"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = i64> {
        0i64..=1_000
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Totals equal the exact ledger sums and are never negative
        #[test]
        fn prop_totals_match_ledger_sums(
            baseline in quantity_strategy(),
            sold in prop::collection::vec(quantity_strategy(), 0..20),
            bought in prop::collection::vec(quantity_strategy(), 0..20),
        ) {
            let products = vec![product("P1", "Widget", 10)];
            let inventory = vec![snapshot("I1", "P1", baseline)];
            let sales: Vec<SaleRecord> = sold
                .iter()
                .enumerate()
                .map(|(i, q)| sale(&format!("S{}", i), "P1", "2024-01-01", *q))
                .collect();
            let purchases: Vec<PurchaseRecord> = bought
                .iter()
                .enumerate()
                .map(|(i, q)| purchase(&format!("U{}", i), "P1", "2024-01-01", *q))
                .collect();

            let report = shared::reconcile_stock(&products, &inventory, &sales, &purchases);
            let row = report.row("P1").unwrap();

            prop_assert_eq!(row.total_sold, sold.iter().sum::<i64>());
            prop_assert_eq!(row.total_purchased, bought.iter().sum::<i64>());
            prop_assert!(row.total_sold >= 0 && row.total_purchased >= 0);
            prop_assert_eq!(row.updated_stock, baseline + row.total_purchased - row.total_sold);
        }

        /// Without ledger activity the updated stock is the baseline
        #[test]
        fn prop_no_activity_keeps_baseline(
            baselines in prop::collection::vec(quantity_strategy(), 1..10),
        ) {
            let products: Vec<Product> = (0..baselines.len())
                .map(|i| product(&format!("P{:02}", i), "Item", 5))
                .collect();
            let inventory: Vec<InventorySnapshot> = baselines
                .iter()
                .enumerate()
                .map(|(i, b)| snapshot(&format!("I{:02}", i), &format!("P{:02}", i), *b))
                .collect();

            let report = shared::reconcile_stock(&products, &inventory, &[], &[]);

            for (row, baseline) in report.rows.iter().zip(&baselines) {
                prop_assert_eq!(row.updated_stock, *baseline);
            }
        }

        /// Reaching the reorder point is sufficient, one below is low
        #[test]
        fn prop_reorder_point_boundary(reorder_point in 1i64..=10_000) {
            prop_assert_eq!(StockStatus::classify(reorder_point, reorder_point), StockStatus::Sufficient);
            prop_assert_eq!(StockStatus::classify(reorder_point - 1, reorder_point), StockStatus::Low);
        }
    }
}
