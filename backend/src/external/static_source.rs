//! Fixed in-memory sheets

use std::collections::HashMap;

use async_trait::async_trait;

use super::TabularSource;
use crate::error::{AppError, AppResult};

/// Sheets held as CSV strings, for tests and fixtures
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    sheets: HashMap<String, String>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, name: &str, csv: &str) -> Self {
        self.sheets.insert(name.to_string(), csv.to_string());
        self
    }
}

#[async_trait]
impl TabularSource for StaticSource {
    fn describe(&self) -> String {
        format!("static source ({} sheets)", self.sheets.len())
    }

    async fn fetch_sheet(&self, sheet: &str) -> AppResult<String> {
        self.sheets
            .get(sheet)
            .cloned()
            .ok_or_else(|| AppError::SheetSource {
                sheet: sheet.to_string(),
                message: "worksheet not found".to_string(),
            })
    }
}
