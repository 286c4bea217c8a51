//! Business logic services for the Inventory Dashboard

pub mod reporting;
pub mod sync;

pub use reporting::ReportingService;
pub use sync::SyncService;
