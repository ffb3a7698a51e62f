use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::models::{ExtractedInvoice, InvoiceRecord, PlanOutcome, StockSnapshot};
use crate::service::PlannerService;
use crate::store::parse_extracted;

/// Request body: structured invoice records
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub invoices: Vec<InvoiceRecord>,
    #[serde(default)]
    pub stock: Option<StockSnapshot>,
    /// Defaults to today's local date
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

/// Request body: the extraction step's raw document
#[derive(Debug, Deserialize)]
pub struct ExtractedPlanRequest {
    pub invoices: Vec<ExtractedInvoice>,
    #[serde(default)]
    pub stock: Option<StockSnapshot>,
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub success: bool,
    pub message: String,
    pub outcome: PlanOutcome,
}

pub async fn health_check() -> &'static str {
    "OK"
}

/// Plans orders from structured invoices
pub async fn plan(State(service): State<Arc<PlannerService>>, Json(req): Json<PlanRequest>) -> Response {
    let as_of = req.as_of.unwrap_or_else(today);
    tracing::info!("Planning from {} invoices as of {}", req.invoices.len(), as_of);
    let outcome = service.plan(&req.invoices, req.stock.as_ref(), as_of);
    respond(outcome)
}

/// Plans orders from the extraction step's raw invoice document
pub async fn plan_extracted(
    State(service): State<Arc<PlannerService>>,
    Json(req): Json<ExtractedPlanRequest>,
) -> Response {
    let as_of = req.as_of.unwrap_or_else(today);
    let invoices = parse_extracted(&req.invoices);
    tracing::info!(
        "Planning from {} of {} extracted invoices as of {}",
        invoices.len(),
        req.invoices.len(),
        as_of
    );
    let outcome = service.plan(&invoices, req.stock.as_ref(), as_of);
    respond(outcome)
}

fn respond(outcome: PlanOutcome) -> Response {
    let message = match &outcome {
        PlanOutcome::Planned(report) => format!(
            "Planned {} orders from {} to {}, total ${}",
            report.summary.orders_placed, report.prediction_start, report.horizon_end, report.summary.total_spend
        ),
        PlanOutcome::NothingToPlan(reason) => format!("Nothing to plan: {}", reason.message()),
    };
    let response = PlanResponse {
        success: true,
        message,
        outcome,
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
