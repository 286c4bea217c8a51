//! Inventory snapshot models

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::types::flexible_datetime;

/// A physical stock count for one product at one warehouse location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InventorySnapshot {
    #[validate(length(min = 1, message = "inventory_id must not be empty"))]
    pub inventory_id: String,
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    /// Counted stock as of `last_updated`. A negative count is reported
    /// downstream rather than rejected.
    #[validate(range(max = 1000000000, message = "stock_on_hand must not exceed 1000000000"))]
    pub stock_on_hand: i64,
    #[serde(default)]
    pub warehouse_location: String,
    #[serde(with = "flexible_datetime")]
    pub last_updated: NaiveDateTime,
}
