use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexMap;

use crate::config::PlannerConfig;
use crate::models::{Order, OrderItem, ProductStats};

/// Tops up every non-empty order that is below the merchant minimum
pub fn enforce_minimums(orders: &mut [Order], product_stats: &IndexMap<String, ProductStats>, config: &PlannerConfig) {
    for order in orders.iter_mut() {
        enforce_order_minimum(order, product_stats, config);
    }
}

/// Greedy top-up of a single order.
///
/// Adds one unit at a time to the most expensive line still under its cap;
/// when every line is capped, adds one unit of the most expensive frequent
/// product not yet in the order. Stops when neither move is possible, leaving
/// `meets_minimum == false`.
pub fn enforce_order_minimum(order: &mut Order, product_stats: &IndexMap<String, ProductStats>, config: &PlannerConfig) {
    let minimum = &config.minimum_order_value;
    order.recompute_totals(minimum, &config.delivery_fee);

    while !order.is_empty() && order.items_total < *minimum {
        if let Some(idx) = most_expensive_below_cap(&order.items, product_stats) {
            let item = &mut order.items[idx];
            let qty = item.qty + 1;
            item.set_qty(qty);
        } else if let Some((product, stats)) = most_expensive_frequent(order, product_stats) {
            let mut item = OrderItem::new(product.clone(), 1, stats.unit_price.clone(), stats.max_per_order);
            item.topped_up = true;
            order.items.push(item);
        } else {
            tracing::warn!(
                "Order {} stays below the ${} minimum at ${}",
                order.date, minimum, order.items_total
            );
            break;
        }
        order.recompute_totals(minimum, &config.delivery_fee);
    }
}

/// Index of the highest-priced line that can still grow; first one wins a tie
fn most_expensive_below_cap(items: &[OrderItem], product_stats: &IndexMap<String, ProductStats>) -> Option<usize> {
    let zero = BigDecimal::zero();
    let mut best: Option<usize> = None;
    for (idx, item) in items.iter().enumerate() {
        let cap = product_stats
            .get(&item.product)
            .map_or(item.max_per_order, |s| s.max_per_order);
        if item.qty >= cap || item.unit_price <= zero {
            continue;
        }
        if best.map_or(true, |b| item.unit_price > items[b].unit_price) {
            best = Some(idx);
        }
    }
    best
}

fn most_expensive_frequent<'a>(
    order: &Order,
    product_stats: &'a IndexMap<String, ProductStats>,
) -> Option<(&'a String, &'a ProductStats)> {
    let zero = BigDecimal::zero();
    let mut best: Option<(&String, &ProductStats)> = None;
    for (product, stats) in product_stats {
        if !stats.frequent || stats.unit_price <= zero || order.contains(product) {
            continue;
        }
        if best.map_or(true, |(_, b)| stats.unit_price > b.unit_price) {
            best = Some((product, stats));
        }
    }
    best
}

/// Merges each below-minimum order into the next non-empty order.
///
/// One left-to-right pass over the orders that had items when the pass
/// started. The receiving order's totals are recomputed straight away, so
/// it is judged on its merged contents when the scan reaches it: a receiver
/// lifted to the minimum by a merge is kept as its own order. A scan that
/// kept each receiver's pre-merge flag would instead forward it again, so
/// $30, $30, $60 would collapse into one $120 order rather than two $60
/// ones. Returns the number of orders skipped.
pub fn consolidate_small_orders(orders: &mut [Order], config: &PlannerConfig) -> usize {
    let candidates: Vec<usize> = orders
        .iter()
        .enumerate()
        .filter(|(_, o)| !o.is_empty())
        .map(|(idx, _)| idx)
        .collect();

    let mut merged = 0;
    for pair in candidates.windows(2) {
        let (from, into) = (pair[0], pair[1]);
        if orders[from].meets_minimum {
            continue;
        }

        let moved = std::mem::take(&mut orders[from].items);
        let from_date = orders[from].date;
        orders[from].mark_skipped();

        let target = &mut orders[into];
        for item in moved {
            match target.items.iter_mut().find(|existing| existing.product == item.product) {
                Some(existing) => {
                    let qty = existing.qty + item.qty;
                    existing.set_qty(qty);
                }
                None => target.items.push(item),
            }
        }
        target.notes.push(format!("Merged from {}", from_date.format("%Y-%m-%d")));
        target.recompute_totals(&config.minimum_order_value, &config.delivery_fee);

        tracing::debug!("Merged order {} into {}", from_date, target.date);
        merged += 1;
    }

    merged
}
