//! Spreadsheet-to-database sync service
//! Pulls the products, inventory, sales and purchases sheets and upserts
//! each into its table as an independent unit of work

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::{InventorySnapshot, Keyed, Product, PurchaseRecord, SaleRecord};
use tokio::sync::Mutex;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::external::{parse_sheet, TabularSource};
use crate::store::{InventoryStore, Table};

/// Sync service for on-demand spreadsheet imports
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn InventoryStore>,
    source: Arc<dyn TabularSource>,
    running: Arc<Mutex<()>>,
}

/// Result of syncing one table
#[derive(Debug, Clone, Serialize)]
pub struct TableSyncOutcome {
    pub table: Table,
    pub rows_read: usize,
    pub rows_written: u64,
    pub duplicates_dropped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TableSyncOutcome {
    fn failed(table: Table, error: &AppError) -> Self {
        Self {
            table,
            rows_read: 0,
            rows_written: 0,
            duplicates_dropped: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Result of a full sync run
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub run_id: Uuid,
    pub source: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableSyncOutcome>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.tables.iter().all(TableSyncOutcome::succeeded)
    }

    pub fn failed_tables(&self) -> Vec<Table> {
        self.tables
            .iter()
            .filter(|t| !t.succeeded())
            .map(|t| t.table)
            .collect()
    }

    pub fn outcome(&self, table: Table) -> Option<&TableSyncOutcome> {
        self.tables.iter().find(|t| t.table == table)
    }
}

/// Parsed, validated and de-duplicated rows of one sheet
struct PreparedSheet<T> {
    rows: Vec<T>,
    rows_read: usize,
    duplicates_dropped: usize,
}

fn prepare_sheet<T>(table: Table, body: &str) -> AppResult<PreparedSheet<T>>
where
    T: DeserializeOwned + Validate + Keyed,
{
    let rows: Vec<T> = parse_sheet(table.as_str(), body)?;
    let rows_read = rows.len();

    shared::validate_rows(&rows).map_err(|source| AppError::InvalidRow {
        table: table.to_string(),
        source,
    })?;

    let (rows, duplicates_dropped) = shared::dedupe_by_key(rows);
    if duplicates_dropped > 0 {
        tracing::warn!(
            "Sheet '{}' repeats {} {} value(s); keeping the last occurrence",
            table,
            duplicates_dropped,
            table.primary_key()
        );
    }

    Ok(PreparedSheet {
        rows,
        rows_read,
        duplicates_dropped,
    })
}

impl SyncService {
    pub fn new(store: Arc<dyn InventoryStore>, source: Arc<dyn TabularSource>) -> Self {
        Self {
            store,
            source,
            running: Arc::new(Mutex::new(())),
        }
    }

    /// Whether a run currently holds the sync lock
    pub fn is_running(&self) -> bool {
        self.running.try_lock().is_err()
    }

    /// Sync every table in order. A failed table is recorded in the report
    /// and the remaining tables still run. Overlapping runs are refused.
    pub async fn run(&self) -> AppResult<SyncReport> {
        let _guard = self.running.try_lock().map_err(|_| AppError::SyncInProgress)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let source = self.source.describe();
        tracing::info!("Sync {} started from {}", run_id, source);

        let mut tables = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            let outcome = match self.sync_table(table).await {
                Ok(outcome) => {
                    tracing::info!(
                        "Synced '{}': {} rows read, {} written",
                        table,
                        outcome.rows_read,
                        outcome.rows_written
                    );
                    outcome
                }
                Err(e) => {
                    tracing::error!("Sync {} failed for table '{}': {}", run_id, table, e);
                    TableSyncOutcome::failed(table, &e)
                }
            };
            tables.push(outcome);
        }

        let report = SyncReport {
            run_id,
            source,
            started_at,
            finished_at: Utc::now(),
            tables,
        };

        if report.is_success() {
            tracing::info!("Sync {} completed", run_id);
        } else {
            tracing::warn!("Sync {} completed with failed tables: {:?}", run_id, report.failed_tables());
        }

        Ok(report)
    }

    async fn sync_table(&self, table: Table) -> AppResult<TableSyncOutcome> {
        let body = self.source.fetch_sheet(table.as_str()).await?;

        let (rows_read, rows_written, duplicates_dropped) = match table {
            Table::Products => {
                let sheet = prepare_sheet::<Product>(table, &body)?;
                let written = self.store.upsert_products(&sheet.rows).await?;
                (sheet.rows_read, written, sheet.duplicates_dropped)
            }
            Table::Inventory => {
                let sheet = prepare_sheet::<InventorySnapshot>(table, &body)?;
                let written = self.store.upsert_inventory(&sheet.rows).await?;
                (sheet.rows_read, written, sheet.duplicates_dropped)
            }
            Table::Sales => {
                let sheet = prepare_sheet::<SaleRecord>(table, &body)?;
                let written = self.store.upsert_sales(&sheet.rows).await?;
                (sheet.rows_read, written, sheet.duplicates_dropped)
            }
            Table::Purchases => {
                let sheet = prepare_sheet::<PurchaseRecord>(table, &body)?;
                let written = self.store.upsert_purchases(&sheet.rows).await?;
                (sheet.rows_read, written, sheet.duplicates_dropped)
            }
        };

        Ok(TableSyncOutcome {
            table,
            rows_read,
            rows_written,
            duplicates_dropped,
            error: None,
        })
    }
}
