use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::{Datelike, Weekday};
use indexmap::IndexMap;

use crate::models::{PriceHistoryEntry, PromoInfo};

/// Price spread (as % of the average price) above which a product is promotional
const PROMO_VARIANCE_PCT: f64 = 10.0;
/// Bought-at-min vs bought-at-max quantity ratio that flags discount bulk buying
const BULK_RATIO: f64 = 1.5;
/// Upper bound of a recommended stock-up quantity
const MAX_STOCK_UP: u32 = 6;

/// Derives promotional statistics for every product with at least two priced purchases
pub fn analyze_price_patterns(
    price_history: &IndexMap<String, Vec<PriceHistoryEntry>>,
) -> IndexMap<String, PromoInfo> {
    let mut promo_info = IndexMap::new();

    for (product, history) in price_history {
        if let Some(info) = analyze_product(history) {
            tracing::debug!(
                "Price pattern {}: min {} max {} variance {:.1}% promo={}",
                product, info.min_price, info.max_price, info.price_variance_pct, info.has_promo
            );
            promo_info.insert(product.clone(), info);
        }
    }

    promo_info
}

/// Promotional statistics of a single product. `history` must be date-ascending.
pub fn analyze_product(history: &[PriceHistoryEntry]) -> Option<PromoInfo> {
    if history.len() < 2 {
        return None;
    }

    let min_price = history.iter().map(|h| &h.price).min()?.clone();
    let max_price = history.iter().map(|h| &h.price).max()?.clone();
    let sum = history.iter().fold(BigDecimal::zero(), |acc, h| acc + &h.price);
    let avg_price = sum / BigDecimal::from(history.len() as u64);
    let current_price = history.last()?.price.clone();

    let price_variance_pct = if avg_price > BigDecimal::zero() {
        ((&max_price - &min_price) / &avg_price * BigDecimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };
    let has_promo = price_variance_pct > PROMO_VARIANCE_PCT;

    let mut best_days: Vec<Weekday> = Vec::new();
    let mut best_weeks: Vec<u32> = Vec::new();
    for h in history.iter().filter(|h| h.price == min_price) {
        let day = h.date.weekday();
        if !best_days.contains(&day) {
            best_days.push(day);
        }
        let week = (h.date.day() - 1) / 7 + 1;
        if !best_weeks.contains(&week) {
            best_weeks.push(week);
        }
    }

    let avg_qty_at_min = mean(history.iter().filter(|h| h.price == min_price).map(|h| h.quantity));
    let avg_qty_at_max = mean(history.iter().filter(|h| h.price == max_price).map(|h| h.quantity));
    let bulk_at_discount = avg_qty_at_min > avg_qty_at_max * BULK_RATIO;

    let savings_per_unit = &current_price - &min_price;
    let savings_pct = if current_price > BigDecimal::zero() {
        (&savings_per_unit / &current_price * BigDecimal::from(100))
            .to_f64()
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let avg_qty = mean(history.iter().map(|h| h.quantity));
    let max_qty = history.iter().map(|h| h.quantity).fold(0.0_f64, f64::max);
    let stock_up_qty = stock_up_quantity(avg_qty, max_qty);

    Some(PromoInfo {
        has_promo,
        min_price,
        max_price,
        avg_price: avg_price.round(4),
        current_price,
        price_variance_pct,
        bulk_at_discount,
        savings_per_unit,
        savings_pct,
        stock_up_qty,
        avg_qty,
        price_count: history.len(),
        best_days,
        best_weeks,
    })
}

/// Twice the usual purchase, at least the largest single purchase, at most 6
pub fn stock_up_quantity(avg_qty: f64, max_qty: f64) -> u32 {
    let doubled = (avg_qty * 2.0).floor().max(0.0) as u32;
    let largest = max_qty.ceil().max(0.0) as u32;
    doubled.max(largest).min(MAX_STOCK_UP)
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
