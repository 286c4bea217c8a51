//! Raw table handlers backing the dashboard's table tabs

use axum::{
    extract::{Path, Query, State},
    response::Response,
};

use super::reporting::{respond, ExportQuery};
use crate::error::{AppError, AppResult};
use crate::store::Table;
use crate::AppState;

/// List one of the four tables by name, ordered by primary key
pub async fn get_table(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let table = Table::from_name(&name).ok_or_else(|| AppError::NotFound(format!("Table '{}'", name)))?;
    let format = query.format.as_deref();

    match table {
        Table::Products => respond(state.store.fetch_products().await?, format, table.as_str()),
        Table::Inventory => respond(state.store.fetch_inventory().await?, format, table.as_str()),
        Table::Sales => respond(state.store.fetch_sales().await?, format, table.as_str()),
        Table::Purchases => respond(state.store.fetch_purchases().await?, format, table.as_str()),
    }
}
