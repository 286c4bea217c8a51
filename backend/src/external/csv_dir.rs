//! Sheets exported as CSV files in a local directory

use std::path::PathBuf;

use async_trait::async_trait;

use super::TabularSource;
use crate::error::{AppError, AppResult};

/// Reads `<dir>/<sheet>.csv`
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", sheet))
    }
}

#[async_trait]
impl TabularSource for CsvDirectorySource {
    fn describe(&self) -> String {
        format!("csv directory {}", self.dir.display())
    }

    async fn fetch_sheet(&self, sheet: &str) -> AppResult<String> {
        let path = self.path_for(sheet);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| AppError::SheetSource {
                sheet: sheet.to_string(),
                message: format!("{}: {}", path.display(), e),
            })
    }
}
