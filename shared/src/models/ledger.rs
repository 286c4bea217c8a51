//! Sales and purchase ledger models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// One line of the sales ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SaleRecord {
    #[validate(length(min = 1, message = "sale_id must not be empty"))]
    pub sale_id: String,
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    pub sale_date: NaiveDate,
    #[validate(range(min = 0, max = 1000000000, message = "quantity_sold must be between 0 and 1000000000"))]
    pub quantity_sold: i64,
}

/// One line of the purchase ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PurchaseRecord {
    #[validate(length(min = 1, message = "purchase_id must not be empty"))]
    pub purchase_id: String,
    #[validate(length(min = 1, message = "product_id must not be empty"))]
    pub product_id: String,
    pub purchase_date: NaiveDate,
    #[validate(range(min = 0, max = 1000000000, message = "quantity_purchased must be between 0 and 1000000000"))]
    pub quantity_purchased: i64,
    #[validate(range(min = 0, message = "lead_time_days must not be negative"))]
    pub lead_time_days: i64,
}
