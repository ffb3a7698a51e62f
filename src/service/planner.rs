use bigdecimal::{BigDecimal, Zero};
use chrono::{Duration, NaiveDate};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::{PlannerConfig, MAX_PLANNING_HORIZON_DAYS};
use crate::models::{InvoiceRecord, NothingToPlan, Order, PlanOutcome, PlanReport, PlanSummary, StockSnapshot};
use crate::service::builder::build_minimal_orders;
use crate::service::calendar::generate_order_dates;
use crate::service::consumption::ConsumptionEstimator;
use crate::service::history::PurchaseHistory;
use crate::service::minimums::{consolidate_small_orders, enforce_minimums};
use crate::service::name_match::{ProductMatcher, TokenSubsetMatcher};
use crate::service::price_patterns::analyze_price_patterns;

/// Replenishment planning service: one call, one independent planning run
pub struct PlannerService {
    config: PlannerConfig,
    matcher: Arc<dyn ProductMatcher>,
}

impl PlannerService {
    pub fn new(config: PlannerConfig) -> Self {
        Self::with_matcher(config, Arc::new(TokenSubsetMatcher))
    }

    pub fn with_matcher(config: PlannerConfig, matcher: Arc<dyn ProductMatcher>) -> Self {
        Self { config, matcher }
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plans future orders from purchase history.
    ///
    /// `as_of` is "today"; planning starts the day after the last invoice at
    /// the earliest. Never fails: an empty or stale history yields
    /// [`PlanOutcome::NothingToPlan`].
    pub fn plan(&self, invoices: &[InvoiceRecord], stock: Option<&StockSnapshot>, as_of: NaiveDate) -> PlanOutcome {
        if invoices.is_empty() {
            return self.nothing(NothingToPlan::NoInvoices);
        }

        // Phase 1: group history
        let history = PurchaseHistory::from_invoices(invoices);
        if history.undated_invoices > 0 {
            tracing::warn!("Dropped {} invoices without a date", history.undated_invoices);
        }
        let Some(last_invoice_date) = history.last_invoice_date else {
            return self.nothing(NothingToPlan::NoDatedInvoices);
        };
        if history.is_empty() {
            return self.nothing(NothingToPlan::NoProducts);
        }
        tracing::info!(
            "Loaded {} grouped records across {} products",
            history.record_count(),
            history.product_count()
        );

        // Phase 2: planning window
        let horizon_days = self.config.planning_horizon_days.clamp(0, MAX_PLANNING_HORIZON_DAYS);
        let (Some(horizon_end), Some(next_day)) = (
            last_invoice_date.checked_add_signed(Duration::days(horizon_days)),
            last_invoice_date.succ_opt(),
        ) else {
            return self.nothing(NothingToPlan::HorizonElapsed);
        };
        let prediction_start = as_of.max(next_day);
        if prediction_start > horizon_end {
            return self.nothing(NothingToPlan::HorizonElapsed);
        }

        // Phase 3: price patterns and consumption
        let promo_info = analyze_price_patterns(&history.price_history);
        let promo_count = promo_info.values().filter(|p| p.has_promo).count();
        tracing::info!(
            "Analyzed price history: {} products, {} with promotional patterns",
            history.price_history.len(),
            promo_count
        );

        if let Some(snapshot) = stock {
            tracing::info!(
                "Using stock snapshot from {}: {} items",
                snapshot
                    .stock_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "unknown date".to_string()),
                snapshot.items.len()
            );
        }

        let estimator = ConsumptionEstimator::new(&self.config, self.matcher.as_ref());
        let product_stats = estimator.estimate(&history, prediction_start, &promo_info, stock);
        if product_stats.is_empty() {
            return self.nothing(NothingToPlan::NoMeasurableDemand);
        }
        tracing::info!("Modeled consumption for {} products", product_stats.len());

        // Phase 4: calendar
        let order_dates = generate_order_dates(prediction_start, horizon_end, self.config.cadence());
        if order_dates.is_empty() {
            return self.nothing(NothingToPlan::NoOrderDates);
        }
        tracing::info!(
            "Planning {} order dates from {} to {}",
            order_dates.len(),
            prediction_start,
            horizon_end
        );

        // Phase 5: build, top up, consolidate
        let mut orders = build_minimal_orders(&product_stats, &order_dates, prediction_start, &self.config);
        enforce_minimums(&mut orders, &product_stats, &self.config);
        let merged = consolidate_small_orders(&mut orders, &self.config);
        for order in orders.iter_mut().filter(|o| !o.skipped) {
            order.recompute_totals(&self.config.minimum_order_value, &self.config.delivery_fee);
        }

        let mut summary = summarize(&orders, &self.config);
        summary.promo_products = product_stats.values().filter(|s| s.has_promo()).count();

        tracing::info!(
            "Planned {} orders ({} merged, {} below minimum), total ${}",
            summary.orders_placed,
            merged,
            summary.orders_below_minimum,
            summary.total_spend
        );

        PlanOutcome::Planned(PlanReport {
            last_invoice_date,
            prediction_start,
            horizon_end,
            orders,
            product_stats,
            summary,
        })
    }

    fn nothing(&self, reason: NothingToPlan) -> PlanOutcome {
        tracing::info!("Nothing to plan: {}", reason.message());
        PlanOutcome::NothingToPlan(reason)
    }
}

/// Spend totals over the placed orders of a plan
pub fn summarize(orders: &[Order], config: &PlannerConfig) -> PlanSummary {
    let mut items_spend = BigDecimal::zero();
    let mut total_spend = BigDecimal::zero();
    let mut monthly_spend: BTreeMap<String, BigDecimal> = BTreeMap::new();
    let mut orders_placed = 0usize;
    let mut orders_below_minimum = 0usize;

    for order in orders.iter().filter(|o| o.is_placed()) {
        orders_placed += 1;
        if !order.meets_minimum {
            orders_below_minimum += 1;
        }
        items_spend += &order.items_total;
        total_spend += &order.total_with_delivery;
        *monthly_spend
            .entry(order.date.format("%Y-%m").to_string())
            .or_insert_with(BigDecimal::zero) += &order.total_with_delivery;
    }

    let delivery_fees = &config.delivery_fee * BigDecimal::from(orders_placed as u64);
    let average_per_order = if orders_placed > 0 {
        Some((&total_spend / BigDecimal::from(orders_placed as u64)).round(2))
    } else {
        None
    };

    PlanSummary {
        orders_placed,
        orders_below_minimum,
        orders_skipped: orders.iter().filter(|o| o.skipped).count(),
        items_spend,
        total_spend,
        delivery_fees,
        average_per_order,
        promo_products: 0,
        monthly_spend,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    #[test]
    fn test_no_invoices() {
        let service = PlannerService::new(PlannerConfig::default());
        assert_eq!(
            service.plan(&[], None, d(2025, 1, 1)),
            PlanOutcome::NothingToPlan(NothingToPlan::NoInvoices)
        );
    }

    #[test]
    fn test_only_undated_invoices() {
        let service = PlannerService::new(PlannerConfig::default());
        let mut invoice = InvoiceRecord::new(d(2025, 1, 1)).with_item("Milk", dec("1"), dec("3"));
        invoice.date = None;
        assert_eq!(
            service.plan(&[invoice], None, d(2025, 1, 1)),
            PlanOutcome::NothingToPlan(NothingToPlan::NoDatedInvoices)
        );
    }

    #[test]
    fn test_stale_history_has_no_window() {
        let service = PlannerService::new(PlannerConfig::default());
        let invoices = vec![
            InvoiceRecord::new(d(2025, 1, 1)).with_item("Milk", dec("2"), dec("3")),
            InvoiceRecord::new(d(2025, 1, 8)).with_item("Milk", dec("2"), dec("3")),
        ];
        assert_eq!(
            service.plan(&invoices, None, d(2025, 3, 1)),
            PlanOutcome::NothingToPlan(NothingToPlan::HorizonElapsed)
        );
    }

    #[test]
    fn test_prediction_starts_after_last_invoice() {
        let service = PlannerService::new(PlannerConfig::default());
        let invoices = vec![
            InvoiceRecord::new(d(2025, 1, 1)).with_item("Milk", dec("2"), dec("3")),
            InvoiceRecord::new(d(2025, 1, 8)).with_item("Milk", dec("2"), dec("3")),
        ];
        // as_of earlier than the last invoice
        let report = service.plan(&invoices, None, d(2025, 1, 2)).into_report().unwrap();
        assert_eq!(report.prediction_start, d(2025, 1, 9));
        assert_eq!(report.horizon_end, d(2025, 2, 7));
        assert_eq!(report.last_invoice_date, d(2025, 1, 8));
    }

    #[test]
    fn test_oversized_horizon_does_not_overflow() {
        let config = PlannerConfig {
            planning_horizon_days: 1_000_000_000,
            ..PlannerConfig::default()
        };
        let service = PlannerService::new(config);
        let invoices = vec![
            InvoiceRecord::new(d(2025, 1, 1)).with_item("Milk", dec("2"), dec("3")),
            InvoiceRecord::new(d(2025, 1, 8)).with_item("Milk", dec("2"), dec("3")),
        ];
        let report = service.plan(&invoices, None, d(2025, 1, 9)).into_report().unwrap();
        assert_eq!(report.horizon_end, d(2025, 1, 8) + Duration::days(MAX_PLANNING_HORIZON_DAYS));
    }

    #[test]
    fn test_summary_counts_only_placed_orders() {
        let config = PlannerConfig::default();
        let mut placed = Order::new(d(2025, 1, 7));
        placed.items.push(crate::models::OrderItem::new("Coffee", 4, dec("15"), 4));
        placed.recompute_totals(&config.minimum_order_value, &config.delivery_fee);
        let mut skipped = Order::new(d(2025, 1, 4));
        skipped.mark_skipped();
        let mut below = Order::new(d(2025, 2, 1));
        below.items.push(crate::models::OrderItem::new("Tea", 1, dec("5"), 1));
        below.recompute_totals(&config.minimum_order_value, &config.delivery_fee);

        let summary = summarize(&[skipped, placed, Order::new(d(2025, 1, 11)), below], &config);
        assert_eq!(summary.orders_placed, 2);
        assert_eq!(summary.orders_skipped, 1);
        assert_eq!(summary.orders_below_minimum, 1);
        assert_eq!(summary.items_spend, dec("65"));
        assert_eq!(summary.total_spend, dec("69"));
        assert_eq!(summary.delivery_fees, dec("4"));
        assert_eq!(summary.average_per_order, Some(dec("34.50")));
        assert_eq!(summary.monthly_spend["2025-01"], dec("62"));
        assert_eq!(summary.monthly_spend["2025-02"], dec("7"));
    }
}
