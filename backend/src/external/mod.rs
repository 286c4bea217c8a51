//! External tabular sources for the sync job
//!
//! A source hands back the raw CSV text of a named sheet; parsing into
//! typed rows happens here so every source shares the same rules.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::config::{SheetSourceKind, SheetsConfig};
use crate::error::{AppError, AppResult};

pub mod csv_dir;
pub mod google_sheets;
pub mod static_source;

pub use csv_dir::CsvDirectorySource;
pub use google_sheets::GoogleSheetsSource;
pub use static_source::StaticSource;

/// A spreadsheet-like source of named sheets
#[async_trait]
pub trait TabularSource: Send + Sync {
    /// Human-readable origin, for logs
    fn describe(&self) -> String;

    /// Raw CSV (header row first) for one sheet
    async fn fetch_sheet(&self, sheet: &str) -> AppResult<String>;
}

/// Parse a sheet's CSV into typed rows. Column order does not matter;
/// headers must match the field names.
pub fn parse_sheet<T: DeserializeOwned>(sheet: &str, body: &str) -> AppResult<Vec<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|e| AppError::SheetSource {
            sheet: sheet.to_string(),
            message: e.to_string(),
        })
}

/// Build the configured source
pub fn source_from_config(config: &SheetsConfig) -> AppResult<Arc<dyn TabularSource>> {
    match config.source {
        SheetSourceKind::Csv => Ok(Arc::new(CsvDirectorySource::new(&config.csv_dir))),
        SheetSourceKind::Google => {
            let spreadsheet_id = config.spreadsheet_id.clone().ok_or_else(|| {
                AppError::Configuration("sheets.spreadsheet_id is required for the google source".into())
            })?;
            let source = GoogleSheetsSource::with_base_url(
                spreadsheet_id,
                config.export_base_url.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(source))
        }
    }
}
