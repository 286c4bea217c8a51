//! Product catalogue models

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A product row from the `products` table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Product {
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    pub product_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub supplier: String,
    /// Stock level below which the product is flagged for replenishment
    #[validate(range(min = 0, message = "reorder_point must not be negative"))]
    pub reorder_point: i64,
    #[validate(range(min = 0, message = "target_stock_level must not be negative"))]
    pub target_stock_level: i64,
}
