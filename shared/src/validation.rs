//! Row validation for tables imported from a spreadsheet
//!
//! Field rules live on the models as `validator` derives; this module adds
//! the table-level checks (row context, duplicate primary keys).

use std::collections::HashMap;

use thiserror::Error;
use validator::Validate;

use crate::models::{InventorySnapshot, Product, PurchaseRecord, SaleRecord};

/// Largest quantity a sheet row may carry (`validator` range on the models)
pub const MAX_QUANTITY: i64 = 1_000_000_000;

/// A row that failed validation, with enough context to find it in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row} (key {key:?}): {message}")]
pub struct RowError {
    /// 1-based data row, not counting the header
    pub row: usize,
    pub key: String,
    pub message: String,
}

/// Rows addressable by their primary key
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Product {
    fn key(&self) -> &str {
        &self.product_id
    }
}

impl Keyed for InventorySnapshot {
    fn key(&self) -> &str {
        &self.inventory_id
    }
}

impl Keyed for SaleRecord {
    fn key(&self) -> &str {
        &self.sale_id
    }
}

impl Keyed for PurchaseRecord {
    fn key(&self) -> &str {
        &self.purchase_id
    }
}

/// Validate every row, stopping at the first failure
pub fn validate_rows<T: Validate + Keyed>(rows: &[T]) -> Result<(), RowError> {
    for (idx, row) in rows.iter().enumerate() {
        if let Err(errors) = row.validate() {
            return Err(RowError {
                row: idx + 1,
                key: row.key().to_string(),
                message: errors.to_string(),
            });
        }
    }
    Ok(())
}

/// Collapse rows sharing a primary key, keeping the last occurrence in the
/// position of the first. Returns the kept rows and how many were dropped.
pub fn dedupe_by_key<T: Keyed>(rows: Vec<T>) -> (Vec<T>, usize) {
    let total = rows.len();
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<T> = Vec::with_capacity(total);

    for row in rows {
        match position.get(row.key()) {
            Some(&idx) => kept[idx] = row,
            None => {
                position.insert(row.key().to_string(), kept.len());
                kept.push(row);
            }
        }
    }

    let dropped = total - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sale(id: &str, qty: i64) -> SaleRecord {
        SaleRecord {
            sale_id: id.to_string(),
            product_id: "P1".to_string(),
            sale_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            quantity_sold: qty,
        }
    }

    #[test]
    fn test_validate_rows_ok() {
        assert!(validate_rows(&[sale("S1", 0), sale("S2", 3)]).is_ok());
    }

    #[test]
    fn test_validate_rows_negative_quantity() {
        let err = validate_rows(&[sale("S1", 1), sale("S2", -4)]).unwrap_err();
        assert_eq!(err.row, 2);
        assert_eq!(err.key, "S2");
        assert!(err.message.contains("quantity_sold"));
    }

    #[test]
    fn test_validate_rows_empty_key() {
        let err = validate_rows(&[sale("", 1)]).unwrap_err();
        assert_eq!(err.row, 1);
    }

    #[test]
    fn test_quantity_cap() {
        assert!(validate_rows(&[sale("S1", MAX_QUANTITY)]).is_ok());
        let err = validate_rows(&[sale("S1", 3), sale("S2", MAX_QUANTITY + 1)]).unwrap_err();
        assert_eq!(err.row, 2);
        assert!(err.message.contains("quantity_sold"));
    }

    #[test]
    fn test_stock_on_hand_cap() {
        let mut snapshot = InventorySnapshot {
            inventory_id: "I1".to_string(),
            product_id: "P1".to_string(),
            stock_on_hand: MAX_QUANTITY,
            warehouse_location: String::new(),
            last_updated: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        };
        assert!(validate_rows(std::slice::from_ref(&snapshot)).is_ok());
        snapshot.stock_on_hand = i64::MAX;
        assert!(validate_rows(&[snapshot]).is_err());
    }

    #[test]
    fn test_dedupe_last_wins() {
        let (rows, dropped) = dedupe_by_key(vec![sale("S1", 1), sale("S2", 2), sale("S1", 9)]);
        assert_eq!(dropped, 1);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].sale_id, "S1");
        assert_eq!(rows[0].quantity_sold, 9);
        assert_eq!(rows[1].sale_id, "S2");
    }
}
