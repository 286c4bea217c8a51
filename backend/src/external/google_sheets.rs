//! Google Sheets CSV export client
//!
//! Downloads each worksheet through the spreadsheet's CSV export endpoint.
//! The spreadsheet must be shared for link access; no OAuth flow is done.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::TabularSource;
use crate::error::{AppError, AppResult};

/// Google Sheets client
#[derive(Clone)]
pub struct GoogleSheetsSource {
    client: Client,
    spreadsheet_id: String,
    base_url: String,
}

impl GoogleSheetsSource {
    /// Create a new GoogleSheetsSource
    pub fn new(spreadsheet_id: String, timeout: Duration) -> AppResult<Self> {
        Self::with_base_url(spreadsheet_id, "https://docs.google.com".to_string(), timeout)
    }

    /// Create a new GoogleSheetsSource with custom base URL (for testing)
    pub fn with_base_url(spreadsheet_id: String, base_url: String, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            spreadsheet_id,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn export_url(&self) -> String {
        format!("{}/spreadsheets/d/{}/gviz/tq", self.base_url, self.spreadsheet_id)
    }
}

#[async_trait]
impl TabularSource for GoogleSheetsSource {
    fn describe(&self) -> String {
        format!("google spreadsheet {}", self.spreadsheet_id)
    }

    async fn fetch_sheet(&self, sheet: &str) -> AppResult<String> {
        let source_error = |message: String| AppError::SheetSource {
            sheet: sheet.to_string(),
            message,
        };

        let response = self
            .client
            .get(self.export_url())
            .query(&[("tqx", "out:csv"), ("sheet", sheet)])
            .send()
            .await
            .map_err(|e| source_error(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(source_error(format!("export returned {} - {}", status, body)));
        }

        response
            .text()
            .await
            .map_err(|e| source_error(format!("failed to read body: {}", e)))
    }
}
