//! Stock reconciliation and sales rankings
//!
//! Pure functions over the four inventory tables. All I/O happens before
//! these are called.
//!
//! Records that reference a product id absent from the product set are
//! excluded from every aggregate and listed in [`StockReport::orphans`].

use std::collections::{BTreeMap, HashMap};

use crate::models::{
    IntegrityIssue, IntegrityIssueKind, InventorySnapshot, OrphanRecord, Product, ProductStock,
    PurchaseRecord, QuantityPoint, ReconciledStockRow, RecordKind, SaleRecord, StockPolicy,
    StockReport, StockStatus, TopSeller,
};
use crate::types::DateRange;

/// Default size of the top-sellers ranking
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Default)]
struct Totals {
    stock_on_hand: i64,
    has_snapshot: bool,
    purchased: i64,
    sold: i64,
    overflowed: bool,
}

impl Totals {
    fn add(total: &mut i64, overflowed: &mut bool, quantity: i64) {
        match total.checked_add(quantity) {
            Some(sum) => *total = sum,
            None => {
                *total = total.saturating_add(quantity);
                *overflowed = true;
            }
        }
    }
}

/// Reconcile with the default baseline-plus-ledger policy
pub fn reconcile_stock(
    products: &[Product],
    inventory: &[InventorySnapshot],
    sales: &[SaleRecord],
    purchases: &[PurchaseRecord],
) -> StockReport {
    reconcile_stock_with(StockPolicy::default(), products, inventory, sales, purchases)
}

/// Produce one [`ReconciledStockRow`] per product, ordered by product id.
///
/// A product without a snapshot gets a zero baseline. Multiple snapshots
/// for one product (several warehouse locations) are summed. A product id
/// listed more than once keeps its last entry, and totals that leave the
/// `i64` range are clamped; both are recorded in [`StockReport::issues`].
pub fn reconcile_stock_with(
    policy: StockPolicy,
    products: &[Product],
    inventory: &[InventorySnapshot],
    sales: &[SaleRecord],
    purchases: &[PurchaseRecord],
) -> StockReport {
    let mut issues = Vec::new();
    let mut catalogue: HashMap<&str, &Product> = HashMap::with_capacity(products.len());
    for product in products {
        if catalogue.insert(product.product_id.as_str(), product).is_some() {
            issues.push(IntegrityIssue {
                kind: IntegrityIssueKind::DuplicateProduct,
                product_id: product.product_id.clone(),
                message: format!("product {} is listed more than once; last entry kept", product.product_id),
            });
        }
    }

    let mut totals: HashMap<&str, Totals> = catalogue
        .keys()
        .map(|id| (*id, Totals::default()))
        .collect();
    let mut orphans = Vec::new();

    for snapshot in inventory {
        match totals.get_mut(snapshot.product_id.as_str()) {
            Some(t) => {
                Totals::add(&mut t.stock_on_hand, &mut t.overflowed, snapshot.stock_on_hand);
                t.has_snapshot = true;
            }
            None => orphans.push(OrphanRecord {
                kind: RecordKind::Inventory,
                record_id: snapshot.inventory_id.clone(),
                product_id: snapshot.product_id.clone(),
                quantity: snapshot.stock_on_hand,
            }),
        }
    }

    for purchase in purchases {
        match totals.get_mut(purchase.product_id.as_str()) {
            Some(t) => Totals::add(&mut t.purchased, &mut t.overflowed, purchase.quantity_purchased),
            None => orphans.push(OrphanRecord {
                kind: RecordKind::Purchase,
                record_id: purchase.purchase_id.clone(),
                product_id: purchase.product_id.clone(),
                quantity: purchase.quantity_purchased,
            }),
        }
    }

    for sale in sales {
        match totals.get_mut(sale.product_id.as_str()) {
            Some(t) => Totals::add(&mut t.sold, &mut t.overflowed, sale.quantity_sold),
            None => orphans.push(OrphanRecord {
                kind: RecordKind::Sale,
                record_id: sale.sale_id.clone(),
                product_id: sale.product_id.clone(),
                quantity: sale.quantity_sold,
            }),
        }
    }

    let mut rows: Vec<ReconciledStockRow> = catalogue
        .values()
        .map(|product| {
            let t = &totals[product.product_id.as_str()];
            let updated_stock = match policy.updated_stock(t.stock_on_hand, t.purchased, t.sold) {
                Some(updated) if !t.overflowed => updated,
                _ => {
                    issues.push(IntegrityIssue {
                        kind: IntegrityIssueKind::QuantityOverflow,
                        product_id: product.product_id.clone(),
                        message: format!("stock totals for {} exceed the supported range", product.product_id),
                    });
                    policy.updated_stock_clamped(t.stock_on_hand, t.purchased, t.sold)
                }
            };
            ReconciledStockRow {
                product_id: product.product_id.clone(),
                product_name: product.product_name.clone(),
                stock_on_hand: t.stock_on_hand,
                total_purchased: t.purchased,
                total_sold: t.sold,
                updated_stock,
                reorder_point: product.reorder_point,
                status: StockStatus::classify(updated_stock, product.reorder_point),
                has_snapshot: t.has_snapshot,
            }
        })
        .collect();
    rows.sort_by(|a, b| a.product_id.cmp(&b.product_id));
    issues.sort_by(|a, b| a.product_id.cmp(&b.product_id));

    let low_count = rows.iter().filter(|r| r.status == StockStatus::Low).count();

    StockReport {
        policy,
        rows,
        orphans,
        issues,
        low_count,
    }
}

/// Rank products by total quantity sold, descending, ties broken by
/// product id ascending. Products without sales are not ranked.
pub fn top_selling(products: &[Product], sales: &[SaleRecord], k: usize) -> Vec<TopSeller> {
    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.product_id.as_str(), p.product_name.as_str()))
        .collect();

    let mut sold: HashMap<&str, i64> = HashMap::new();
    for sale in sales {
        if names.contains_key(sale.product_id.as_str()) {
            let total = sold.entry(sale.product_id.as_str()).or_default();
            *total = total.saturating_add(sale.quantity_sold);
        }
    }

    let mut ranked: Vec<TopSeller> = sold
        .into_iter()
        .map(|(id, quantity_sold)| TopSeller {
            product_id: id.to_string(),
            product_name: names[id].to_string(),
            quantity_sold,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(k);
    ranked
}

/// Daily sales quantities within `range`, oldest first
pub fn sales_over_time(sales: &[SaleRecord], range: &DateRange) -> Vec<QuantityPoint> {
    sum_by_date(
        sales
            .iter()
            .map(|s| (s.sale_date, s.quantity_sold))
            .filter(|(d, _)| range.contains(*d)),
    )
}

/// Daily purchase quantities within `range`, oldest first
pub fn purchases_over_time(purchases: &[PurchaseRecord], range: &DateRange) -> Vec<QuantityPoint> {
    sum_by_date(
        purchases
            .iter()
            .map(|p| (p.purchase_date, p.quantity_purchased))
            .filter(|(d, _)| range.contains(*d)),
    )
}

fn sum_by_date(entries: impl Iterator<Item = (chrono::NaiveDate, i64)>) -> Vec<QuantityPoint> {
    let mut by_date: BTreeMap<chrono::NaiveDate, i64> = BTreeMap::new();
    for (date, quantity) in entries {
        let total = by_date.entry(date).or_default();
        *total = total.saturating_add(quantity);
    }
    by_date
        .into_iter()
        .map(|(date, quantity)| QuantityPoint { date, quantity })
        .collect()
}

/// Raw snapshot stock per inventory row, left-joined to product names
pub fn stock_by_product(products: &[Product], inventory: &[InventorySnapshot]) -> Vec<ProductStock> {
    let names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.product_id.as_str(), p.product_name.as_str()))
        .collect();

    let mut rows: Vec<ProductStock> = inventory
        .iter()
        .map(|s| ProductStock {
            inventory_id: s.inventory_id.clone(),
            product_id: s.product_id.clone(),
            product_name: names.get(s.product_id.as_str()).map(|n| n.to_string()),
            warehouse_location: s.warehouse_location.clone(),
            stock_on_hand: s.stock_on_hand,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.product_id
            .cmp(&b.product_id)
            .then_with(|| a.inventory_id.cmp(&b.inventory_id))
    });
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn product(id: &str, reorder_point: i64) -> Product {
        Product {
            product_id: id.to_string(),
            product_name: format!("Product {}", id),
            category: "General".to_string(),
            supplier: "Acme".to_string(),
            reorder_point,
            target_stock_level: reorder_point * 2,
        }
    }

    fn snapshot(id: &str, product_id: &str, stock: i64) -> InventorySnapshot {
        InventorySnapshot {
            inventory_id: id.to_string(),
            product_id: product_id.to_string(),
            stock_on_hand: stock,
            warehouse_location: "Main".to_string(),
            last_updated: day(1).and_hms_opt(9, 0, 0).unwrap(),
        }
    }

    fn sale(id: &str, product_id: &str, qty: i64) -> SaleRecord {
        SaleRecord {
            sale_id: id.to_string(),
            product_id: product_id.to_string(),
            sale_date: day(2),
            quantity_sold: qty,
        }
    }

    fn purchase(id: &str, product_id: &str, qty: i64) -> PurchaseRecord {
        PurchaseRecord {
            purchase_id: id.to_string(),
            product_id: product_id.to_string(),
            purchase_date: day(3),
            quantity_purchased: qty,
            lead_time_days: 7,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_baseline_plus_ledger() {
        let report = reconcile_stock(
            &[product("P1", 40)],
            &[snapshot("I1", "P1", 50)],
            &[sale("S1", "P1", 15), sale("S2", "P1", 5)],
            &[purchase("U1", "P1", 20), purchase("U2", "P1", 10)],
        );

        let row = report.row("P1").unwrap();
        assert_eq!(row.total_purchased, 30);
        assert_eq!(row.total_sold, 20);
        assert_eq!(row.updated_stock, 60);
        assert_eq!(row.status, StockStatus::Sufficient);
        assert!(report.orphans.is_empty());
    }

    #[test]
    fn test_negative_stock_is_reported_low() {
        let report = reconcile_stock(
            &[product("P2", 5)],
            &[snapshot("I2", "P2", 10)],
            &[sale("S1", "P2", 5), sale("S2", "P2", 8)],
            &[],
        );

        let row = report.row("P2").unwrap();
        assert_eq!(row.total_purchased, 0);
        assert_eq!(row.updated_stock, -3);
        assert_eq!(row.status, StockStatus::Low);
        assert_eq!(report.low_count, 1);
    }

    #[test]
    fn test_missing_snapshot_uses_zero_baseline() {
        let report = reconcile_stock(&[product("P3", 1)], &[], &[], &[purchase("U1", "P3", 4)]);

        let row = report.row("P3").unwrap();
        assert_eq!(row.stock_on_hand, 0);
        assert!(!row.has_snapshot);
        assert_eq!(row.updated_stock, 4);
    }

    #[test]
    fn test_snapshots_summed_across_locations() {
        let report = reconcile_stock(
            &[product("P1", 0)],
            &[snapshot("I1", "P1", 5), snapshot("I2", "P1", 7)],
            &[],
            &[],
        );
        assert_eq!(report.row("P1").unwrap().stock_on_hand, 12);
    }

    #[test]
    fn test_orphans_excluded_and_reported() {
        let report = reconcile_stock(
            &[product("P1", 0)],
            &[snapshot("I9", "GHOST", 3)],
            &[sale("S1", "P1", 2), sale("S2", "GHOST", 9)],
            &[purchase("U1", "NOPE", 4)],
        );

        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.row("P1").unwrap().total_sold, 2);
        assert_eq!(report.orphans.len(), 3);
        assert!(report
            .orphans
            .iter()
            .any(|o| o.kind == RecordKind::Sale && o.record_id == "S2" && o.product_id == "GHOST"));
    }

    #[test]
    fn test_large_ledger_totals_are_clamped_and_reported() {
        let huge = i64::MAX / 2 + 1;
        let report = reconcile_stock(
            &[product("P1", 5)],
            &[],
            &[sale("S1", "P1", huge), sale("S2", "P1", huge)],
            &[],
        );

        let row = report.row("P1").unwrap();
        assert_eq!(row.total_sold, i64::MAX);
        assert_eq!(row.updated_stock, -i64::MAX);
        assert_eq!(row.status, StockStatus::Low);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IntegrityIssueKind::QuantityOverflow);
        assert_eq!(report.issues[0].product_id, "P1");
    }

    #[test]
    fn test_capped_quantities_do_not_overflow() {
        let max = crate::validation::MAX_QUANTITY;
        let sales: Vec<_> = (0..1000).map(|i| sale(&format!("S{}", i), "P1", max)).collect();
        let report = reconcile_stock(&[product("P1", 0)], &[snapshot("I1", "P1", max)], &sales, &[]);

        assert!(report.issues.is_empty());
        assert_eq!(report.row("P1").unwrap().updated_stock, max - 1000 * max);
        assert_eq!(top_selling(&[product("P1", 0)], &sales, 1)[0].quantity_sold, 1000 * max);
    }

    #[test]
    fn test_top_selling_saturates() {
        let huge = i64::MAX / 2 + 1;
        let top = top_selling(&[product("P1", 0)], &[sale("S1", "P1", huge), sale("S2", "P1", huge)], 1);
        assert_eq!(top[0].quantity_sold, i64::MAX);
    }

    #[test]
    fn test_duplicate_product_keeps_last_entry() {
        let mut first = product("P1", 5);
        first.product_name = "A".to_string();
        let mut second = product("P1", 50);
        second.product_name = "B".to_string();

        let report = reconcile_stock(&[first, second], &[snapshot("I1", "P1", 10)], &[], &[]);

        assert_eq!(report.rows.len(), 1);
        let row = report.row("P1").unwrap();
        assert_eq!(row.product_name, "B");
        assert_eq!(row.stock_on_hand, 10);
        assert_eq!(row.status, StockStatus::Low);
        assert_eq!(report.low_count, 1);
        assert_eq!(report.issues.len(), 1);
        assert_eq!(report.issues[0].kind, IntegrityIssueKind::DuplicateProduct);
    }

    #[test]
    fn test_rows_sorted_by_product_id() {
        let report = reconcile_stock(&[product("C", 0), product("A", 0), product("B", 0)], &[], &[], &[]);
        let ids: Vec<_> = report.rows.iter().map(|r| r.product_id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "C"]);
    }

    #[test]
    fn test_ledger_only_policy_ignores_baseline() {
        let report = reconcile_stock_with(
            StockPolicy::LedgerOnly,
            &[product("P1", 5)],
            &[snapshot("I1", "P1", 100)],
            &[sale("S1", "P1", 3)],
            &[purchase("U1", "P1", 6)],
        );
        let row = report.row("P1").unwrap();
        assert_eq!(row.updated_stock, 3);
        assert_eq!(row.status, StockStatus::Low);
        assert_eq!(report.policy, StockPolicy::LedgerOnly);
    }

    #[test]
    fn test_top_selling_ties_by_product_id() {
        let products: Vec<_> = ["P1", "P2", "P3", "P4"].iter().map(|id| product(id, 0)).collect();
        let sales = vec![
            sale("S1", "P1", 100),
            sale("S2", "P3", 200),
            sale("S3", "P2", 250),
            sale("S4", "P3", 50),
            sale("S5", "P4", 5),
        ];

        let top = top_selling(&products, &sales, 2);
        let ids: Vec<_> = top.iter().map(|t| t.product_id.as_str()).collect();
        assert_eq!(ids, ["P2", "P3"]);
        assert_eq!(top[1].quantity_sold, 250);
    }

    #[test]
    fn test_top_selling_zero_k() {
        let products = vec![product("P1", 0)];
        assert!(top_selling(&products, &[sale("S1", "P1", 1)], 0).is_empty());
    }

    #[test]
    fn test_sales_over_time_groups_by_day() {
        let mut late = sale("S3", "P1", 4);
        late.sale_date = day(9);
        let sales = vec![late, sale("S1", "P1", 1), sale("S2", "P2", 2)];

        let points = sales_over_time(&sales, &DateRange::default());
        assert_eq!(
            points,
            vec![
                QuantityPoint { date: day(2), quantity: 3 },
                QuantityPoint { date: day(9), quantity: 4 },
            ]
        );

        let bounded = sales_over_time(&sales, &DateRange::new(Some(day(5)), None));
        assert_eq!(bounded.len(), 1);
    }

    #[test]
    fn test_stock_by_product_left_join() {
        let rows = stock_by_product(
            &[product("P1", 0)],
            &[snapshot("I2", "P9", 1), snapshot("I1", "P1", 8)],
        );
        assert_eq!(rows[0].product_name.as_deref(), Some("Product P1"));
        assert_eq!(rows[1].product_name, None);
    }
}
