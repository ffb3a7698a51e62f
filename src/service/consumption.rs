//! Per-product consumption model.
//!
//! Daily rates use the *per-order-lifetime* model: each purchase is assumed
//! to last until the next one, so the rate is the average purchase size over
//! the average reorder interval. A product bought only once is assumed to
//! last for a period bucketed by how much was bought. On-hand stock comes
//! from a counted snapshot when one matches, otherwise from the last order
//! depleting linearly.

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::config::PlannerConfig;
use crate::models::{ProductStats, PromoInfo, StockSnapshot, StockSource};
use crate::service::history::{DailyQuantity, PurchaseHistory};
use crate::service::name_match::{lookup_stock, ProductMatcher};

/// Fallback lifetime of a purchase when no interval can be measured
const DEFAULT_PERIOD_DAYS: f64 = 7.0;
/// Average reorder interval at or below which a product counts as frequent
const FREQUENT_INTERVAL_DAYS: f64 = 14.0;
const FREQUENT_MIN_ORDERS: usize = 3;
const FREQUENT_WEEKLY_NEED: f64 = 0.5;

pub struct ConsumptionEstimator<'a> {
    config: &'a PlannerConfig,
    matcher: &'a dyn ProductMatcher,
}

impl<'a> ConsumptionEstimator<'a> {
    pub fn new(config: &'a PlannerConfig, matcher: &'a dyn ProductMatcher) -> Self {
        Self { config, matcher }
    }

    /// Builds stats for every product that can be modeled
    pub fn estimate(
        &self,
        history: &PurchaseHistory,
        prediction_start: NaiveDate,
        promo_info: &IndexMap<String, PromoInfo>,
        stock: Option<&StockSnapshot>,
    ) -> IndexMap<String, ProductStats> {
        let mut stats = IndexMap::new();
        for (product, orders) in &history.orders {
            let Some(unit_price) = history.latest_price(product) else {
                tracing::debug!("Skipping {}: no priced purchase", product);
                continue;
            };

            let input = ProductInput {
                product,
                orders,
                unit_price,
                prediction_start,
                promo: promo_info.get(product),
                stock,
            };
            if let Some(s) = self.estimate_product(&input) {
                stats.insert(product.clone(), s);
            }
        }

        stats
    }

    fn estimate_product(&self, input: &ProductInput<'_>) -> Option<ProductStats> {
        let orders = input.orders;
        let total_qty: f64 = orders.iter().map(|o| o.quantity).sum();
        if total_qty <= 0.0 || *input.unit_price <= BigDecimal::zero() {
            return None;
        }

        let last = orders.last()?;
        let order_count = orders.len();
        let days_since_last_order = (input.prediction_start - last.date).num_days();

        if order_count < 2 && days_since_last_order > self.config.recent_single_order_days {
            tracing::debug!(
                "Skipping {}: single purchase {} days before planning start",
                input.product, days_since_last_order
            );
            return None;
        }

        let avg_interval = average_interval(orders);
        let avg_qty_per_order = total_qty / order_count as f64;

        let daily_rate = match avg_interval {
            Some(interval) if interval > 0.0 => avg_qty_per_order / interval,
            Some(_) => avg_qty_per_order / DEFAULT_PERIOD_DAYS,
            None => total_qty / single_purchase_lifetime(total_qty),
        };
        if daily_rate <= 0.0 || !daily_rate.is_finite() {
            return None;
        }

        let weekly_need = daily_rate * 7.0;
        let frequent = (order_count >= FREQUENT_MIN_ORDERS
            && avg_interval.map_or(false, |i| i <= FREQUENT_INTERVAL_DAYS))
            || weekly_need >= FREQUENT_WEEKLY_NEED;

        let mut max_per_order = (avg_qty_per_order.ceil() as u32).max(1);
        if let Some(promo) = input.promo.filter(|p| p.has_promo) {
            max_per_order = max_per_order.max(promo.stock_up_qty);
        }

        let last_order_qty = last.quantity;
        let snapshot = input.stock.and_then(|snapshot| {
            let stock_date = snapshot.stock_date?;
            let counted = lookup_stock(snapshot, input.product, self.matcher)?;
            Some((counted, stock_date))
        });

        let (estimated_stock, stock_source) = match snapshot {
            Some((counted, stock_date)) => {
                let elapsed = (input.prediction_start - stock_date).num_days() as f64;
                ((counted - daily_rate * elapsed).max(0.0), StockSource::Snapshot)
            }
            None => {
                let elapsed = days_since_last_order as f64;
                ((last_order_qty - daily_rate * elapsed).max(0.0), StockSource::Estimated)
            }
        };
        let days_until_empty = estimated_stock / daily_rate;

        tracing::debug!(
            "Modeled {}: {:.3}/day, stock {:.1} ({:?}), empty in {:.1} days",
            input.product, daily_rate, estimated_stock, stock_source, days_until_empty
        );

        Some(ProductStats {
            daily_rate,
            weekly_need,
            avg_interval,
            avg_qty_per_order,
            frequent,
            max_per_order,
            unit_price: input.unit_price.clone(),
            estimated_stock,
            days_until_empty,
            order_count,
            last_order_date: last.date,
            last_order_qty,
            days_since_last_order,
            stock_source,
            promo: input.promo.cloned(),
        })
    }
}

struct ProductInput<'a> {
    product: &'a str,
    orders: &'a [DailyQuantity],
    unit_price: &'a BigDecimal,
    prediction_start: NaiveDate,
    promo: Option<&'a PromoInfo>,
    stock: Option<&'a StockSnapshot>,
}

/// Days a one-off purchase is assumed to last
pub fn single_purchase_lifetime(quantity: f64) -> f64 {
    if quantity <= 2.0 {
        7.0
    } else if quantity <= 5.0 {
        14.0
    } else if quantity <= 10.0 {
        21.0
    } else {
        30.0
    }
}

/// Mean number of days between consecutive purchases
pub fn average_interval(orders: &[DailyQuantity]) -> Option<f64> {
    if orders.len() < 2 {
        return None;
    }
    let total: i64 = orders
        .windows(2)
        .map(|w| (w[1].date - w[0].date).num_days())
        .sum();
    Some(total as f64 / (orders.len() - 1) as f64)
}
