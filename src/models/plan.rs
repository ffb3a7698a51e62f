use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Order, ProductStats};

/// Why a planning run produced no plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NothingToPlan {
    NoInvoices,
    NoDatedInvoices,
    NoProducts,
    HorizonElapsed,
    NoMeasurableDemand,
    NoOrderDates,
}

impl NothingToPlan {
    pub fn message(&self) -> &'static str {
        match self {
            NothingToPlan::NoInvoices => "no invoices supplied",
            NothingToPlan::NoDatedInvoices => "no invoice carries a valid date",
            NothingToPlan::NoProducts => "no purchased products found",
            NothingToPlan::HorizonElapsed => "last invoice is older than the planning horizon",
            NothingToPlan::NoMeasurableDemand => "no products with measurable demand",
            NothingToPlan::NoOrderDates => "no order dates fall within the planning window",
        }
    }
}

/// Spend totals over a finished plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub orders_placed: usize,
    pub orders_below_minimum: usize,
    pub orders_skipped: usize,
    pub items_spend: BigDecimal,
    pub total_spend: BigDecimal,
    pub delivery_fees: BigDecimal,
    pub average_per_order: Option<BigDecimal>,
    pub promo_products: usize,
    /// "YYYY-MM" -> spend including delivery
    pub monthly_spend: BTreeMap<String, BigDecimal>,
}

/// A finished plan handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanReport {
    pub last_invoice_date: NaiveDate,
    pub prediction_start: NaiveDate,
    pub horizon_end: NaiveDate,
    pub orders: Vec<Order>,
    pub product_stats: IndexMap<String, ProductStats>,
    pub summary: PlanSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum PlanOutcome {
    Planned(PlanReport),
    NothingToPlan(NothingToPlan),
}

impl PlanOutcome {
    pub fn report(&self) -> Option<&PlanReport> {
        match self {
            PlanOutcome::Planned(report) => Some(report),
            PlanOutcome::NothingToPlan(_) => None,
        }
    }

    pub fn into_report(self) -> Option<PlanReport> {
        match self {
            PlanOutcome::Planned(report) => Some(report),
            PlanOutcome::NothingToPlan(_) => None,
        }
    }
}
