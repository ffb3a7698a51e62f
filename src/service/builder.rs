use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::config::{BatchSizing, PlannerConfig};
use crate::models::{Order, OrderItem, ProductStats};

/// Schedules just-in-time restocks of every product over `order_dates`.
///
/// Products are simulated independently, most urgent first (fewest days of
/// stock left, then highest weekly need). A line is added on a date only when
/// projected stock would not last until the next order date.
pub fn build_minimal_orders(
    product_stats: &IndexMap<String, ProductStats>,
    order_dates: &[NaiveDate],
    start_date: NaiveDate,
    config: &PlannerConfig,
) -> Vec<Order> {
    let mut orders: Vec<Order> = order_dates.iter().map(|&d| Order::new(d)).collect();

    let mut by_urgency: Vec<(&String, &ProductStats)> = product_stats.iter().collect();
    by_urgency.sort_by(|a, b| {
        a.1.days_until_empty
            .total_cmp(&b.1.days_until_empty)
            .then_with(|| b.1.weekly_need.total_cmp(&a.1.weekly_need))
    });

    for (product, stats) in by_urgency {
        if stats.daily_rate <= 0.0 {
            continue;
        }
        if stats.weekly_need < config.min_weekly_need {
            tracing::debug!("Not scheduling {}: {:.2} units/week", product, stats.weekly_need);
            continue;
        }

        let mut current_stock = stats.estimated_stock;
        let mut last_touch = start_date;

        for idx in 0..orders.len() {
            let order_date = orders[idx].date;
            let elapsed = (order_date - last_touch).num_days() as f64;
            current_stock -= stats.daily_rate * elapsed;
            last_touch = order_date;

            let days_until_next = match orders.get(idx + 1) {
                Some(next) => (next.date - order_date).num_days(),
                None => config.last_order_buffer_days,
            };
            let needed_for_period = stats.daily_rate * days_until_next as f64;

            if current_stock < needed_for_period {
                let shortfall = needed_for_period - current_stock;
                let qty = restock_quantity(shortfall, stats, config.batch_sizing);

                let mut item = OrderItem::new(product.clone(), qty, stats.unit_price.clone(), stats.max_per_order);
                item.stock_before = round1(current_stock.max(0.0));
                item.need_until_next = round1(needed_for_period);
                orders[idx].items.push(item);

                current_stock += qty as f64;
            }
        }
    }

    orders
}

/// Units to order for a shortfall, always within `[1, max_per_order]`
pub fn restock_quantity(shortfall: f64, stats: &ProductStats, policy: BatchSizing) -> u32 {
    let cap = stats.max_per_order.max(1);
    let qty = match policy {
        BatchSizing::CoverShortfall => shortfall.ceil().max(1.0).min(cap as f64) as u32,
        BatchSizing::TypicalBatch => {
            if shortfall > stats.avg_qty_per_order {
                cap
            } else {
                (stats.avg_qty_per_order.round() as u32).max(1)
            }
        }
    };
    qty.clamp(1, cap)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
