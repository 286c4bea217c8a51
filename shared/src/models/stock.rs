//! Derived stock-position models
//!
//! None of these are persisted; they are rebuilt from the four tables on
//! every report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stock classification against a product's reorder point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StockStatus {
    Low,
    Sufficient,
}

impl StockStatus {
    /// `Low` strictly below the reorder point; equality is `Sufficient`
    pub fn classify(updated_stock: i64, reorder_point: i64) -> Self {
        if updated_stock < reorder_point {
            StockStatus::Low
        } else {
            StockStatus::Sufficient
        }
    }
}

impl fmt::Display for StockStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockStatus::Low => write!(f, "Low"),
            StockStatus::Sufficient => write!(f, "Sufficient"),
        }
    }
}

/// Rule used to derive the current stock figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockPolicy {
    /// Baseline snapshot plus purchases minus sales
    #[default]
    SnapshotPlusLedger,
    /// Purchases minus sales, baseline ignored
    LedgerOnly,
    /// Baseline snapshot as recorded, ledgers ignored
    SnapshotOnly,
}

impl StockPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockPolicy::SnapshotPlusLedger => "snapshot_plus_ledger",
            StockPolicy::LedgerOnly => "ledger_only",
            StockPolicy::SnapshotOnly => "snapshot_only",
        }
    }

    fn apply_wide(&self, stock_on_hand: i128, total_purchased: i128, total_sold: i128) -> i128 {
        match self {
            StockPolicy::SnapshotPlusLedger => stock_on_hand + total_purchased - total_sold,
            StockPolicy::LedgerOnly => total_purchased - total_sold,
            StockPolicy::SnapshotOnly => stock_on_hand,
        }
    }

    /// `None` when the result does not fit in an `i64`
    pub fn updated_stock(&self, stock_on_hand: i64, total_purchased: i64, total_sold: i64) -> Option<i64> {
        let wide = self.apply_wide(stock_on_hand.into(), total_purchased.into(), total_sold.into());
        i64::try_from(wide).ok()
    }

    /// Same as [`updated_stock`](Self::updated_stock), clamped to the `i64` range
    pub fn updated_stock_clamped(&self, stock_on_hand: i64, total_purchased: i64, total_sold: i64) -> i64 {
        let wide = self.apply_wide(stock_on_hand.into(), total_purchased.into(), total_sold.into());
        wide.clamp(i64::MIN.into(), i64::MAX.into()) as i64
    }
}

impl FromStr for StockPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "snapshot_plus_ledger" => Ok(StockPolicy::SnapshotPlusLedger),
            "ledger_only" => Ok(StockPolicy::LedgerOnly),
            "snapshot_only" => Ok(StockPolicy::SnapshotOnly),
            other => Err(format!("unknown stock policy: {}", other)),
        }
    }
}

impl fmt::Display for StockPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current stock position for one product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciledStockRow {
    pub product_id: String,
    pub product_name: String,
    /// Baseline from the inventory snapshot(s); 0 when none exists
    pub stock_on_hand: i64,
    pub total_purchased: i64,
    pub total_sold: i64,
    pub updated_stock: i64,
    pub reorder_point: i64,
    pub status: StockStatus,
    pub has_snapshot: bool,
}

/// Which table an orphaned record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Sale,
    Purchase,
    Inventory,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Sale => write!(f, "sale"),
            RecordKind::Purchase => write!(f, "purchase"),
            RecordKind::Inventory => write!(f, "inventory"),
        }
    }
}

/// A record referencing a product id that is not in the product set.
/// Excluded from aggregation and reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrphanRecord {
    pub kind: RecordKind,
    pub record_id: String,
    pub product_id: String,
    pub quantity: i64,
}

/// Kinds of input inconsistency found while reconciling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrityIssueKind {
    /// The product id appears more than once; the last entry was kept
    DuplicateProduct,
    /// A total left the `i64` range; the figure was clamped
    QuantityOverflow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityIssue {
    pub kind: IntegrityIssueKind,
    pub product_id: String,
    pub message: String,
}

/// Output of a reconciliation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockReport {
    pub policy: StockPolicy,
    pub rows: Vec<ReconciledStockRow>,
    pub orphans: Vec<OrphanRecord>,
    #[serde(default)]
    pub issues: Vec<IntegrityIssue>,
    pub low_count: usize,
}

impl StockReport {
    pub fn low_stock(&self) -> impl Iterator<Item = &ReconciledStockRow> {
        self.rows.iter().filter(|r| r.status == StockStatus::Low)
    }

    pub fn row(&self, product_id: &str) -> Option<&ReconciledStockRow> {
        self.rows.iter().find(|r| r.product_id == product_id)
    }
}

/// Entry in the top-sellers ranking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSeller {
    pub product_id: String,
    pub product_name: String,
    pub quantity_sold: i64,
}

/// Quantity summed over one calendar day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityPoint {
    pub date: NaiveDate,
    pub quantity: i64,
}

/// Raw stock on hand for one inventory row, joined with its product name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStock {
    pub inventory_id: String,
    pub product_id: String,
    pub product_name: Option<String>,
    pub warehouse_location: String,
    pub stock_on_hand: i64,
}
