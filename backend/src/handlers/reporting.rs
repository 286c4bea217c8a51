//! Reporting handlers for stock position, rankings and chart data

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::{DateRange, StockPolicy};

use crate::error::{AppError, AppResult};
use crate::services::reporting::{DashboardReport, ReportFilter, ReportingService};
use crate::AppState;

#[derive(Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>, // "json" or "csv"
}

#[derive(Deserialize)]
pub struct StockQuery {
    pub policy: Option<StockPolicy>,
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct TopSellersQuery {
    pub limit: Option<usize>,
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub format: Option<String>,
}

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub policy: Option<StockPolicy>,
    pub limit: Option<usize>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Render rows as JSON, or as a CSV attachment when `format=csv`
pub(crate) fn respond<T: Serialize>(data: Vec<T>, format: Option<&str>, name: &str) -> AppResult<Response> {
    if format == Some("csv") {
        let csv = ReportingService::export_to_csv(&data)?;
        Ok((
            [
                (header::CONTENT_TYPE, "text/csv".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}.csv\"", name),
                ),
            ],
            csv,
        )
            .into_response())
    } else {
        Ok(Json(data).into_response())
    }
}

fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<DateRange> {
    if let (Some(s), Some(e)) = (start, end) {
        if s > e {
            return Err(AppError::Validation {
                field: "start_date".to_string(),
                message: "start_date must not be after end_date".to_string(),
            });
        }
    }
    Ok(DateRange::new(start, end))
}

/// Get the reconciled stock report
pub async fn get_stock_report(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let policy = query.policy.unwrap_or(state.report.stock_policy);
    let report = service.get_stock_report(policy).await?;

    if query.format.as_deref() == Some("csv") {
        respond(report.rows, Some("csv"), "stock_report")
    } else {
        Ok(Json(report).into_response())
    }
}

/// Get products below their reorder point
pub async fn get_low_stock(
    State(state): State<AppState>,
    Query(query): Query<StockQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let policy = query.policy.unwrap_or(state.report.stock_policy);
    let rows = service.get_low_stock(policy).await?;
    respond(rows, query.format.as_deref(), "low_stock")
}

/// Get top-selling products
pub async fn get_top_sellers(
    State(state): State<AppState>,
    Query(query): Query<TopSellersQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let limit = query.limit.unwrap_or(state.report.top_n);
    let rows = service.get_top_sellers(limit).await?;
    respond(rows, query.format.as_deref(), "top_sellers")
}

/// Get daily sales quantities
pub async fn get_sales_over_time(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let range = date_range(query.start_date, query.end_date)?;
    let points = service.get_sales_over_time(&range).await?;
    respond(points, query.format.as_deref(), "sales_over_time")
}

/// Get daily purchase quantities
pub async fn get_purchases_over_time(
    State(state): State<AppState>,
    Query(query): Query<RangeQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let range = date_range(query.start_date, query.end_date)?;
    let points = service.get_purchases_over_time(&range).await?;
    respond(points, query.format.as_deref(), "purchases_over_time")
}

/// Get raw stock on hand per inventory row
pub async fn get_stock_by_product(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> AppResult<Response> {
    let service = ReportingService::new(state.store.clone());
    let rows = service.get_stock_by_product().await?;
    respond(rows, query.format.as_deref(), "stock_by_product")
}

/// Get dashboard data
pub async fn get_dashboard(
    State(state): State<AppState>,
    Query(query): Query<DashboardQuery>,
) -> AppResult<Json<DashboardReport>> {
    let service = ReportingService::new(state.store.clone());

    let filter = ReportFilter {
        policy: query.policy.unwrap_or(state.report.stock_policy),
        range: date_range(query.start_date, query.end_date)?,
        top_n: query.limit.unwrap_or(state.report.top_n),
    };

    let dashboard = service.get_dashboard(&filter).await?;
    Ok(Json(dashboard))
}
