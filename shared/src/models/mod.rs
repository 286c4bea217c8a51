//! Domain models for the Inventory Dashboard

mod inventory;
mod ledger;
mod product;
mod stock;

pub use inventory::*;
pub use ledger::*;
pub use product::*;
pub use stock::*;
