//! Shared types and models for the Inventory Dashboard
//!
//! This crate contains the domain rows read from the inventory database,
//! the pure stock-reconciliation functions, and row validation. It is used
//! by the backend and by the browser dashboard (via WASM).

pub mod models;
pub mod reconciliation;
pub mod types;
pub mod validation;

pub use models::*;
pub use reconciliation::*;
pub use types::*;
pub use validation::*;
