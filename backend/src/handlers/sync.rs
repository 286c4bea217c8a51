//! Sync handler for the spreadsheet import button

use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::services::sync::SyncReport;
use crate::AppState;

/// Run a full sync; 409 while another run is in progress
pub async fn run_sync(State(state): State<AppState>) -> AppResult<Json<SyncReport>> {
    let report = state.sync.run().await?;
    Ok(Json(report))
}
