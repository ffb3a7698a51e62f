use bigdecimal::BigDecimal;
use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// One priced purchase of a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistoryEntry {
    pub date: NaiveDate,
    pub price: BigDecimal,
    pub quantity: f64,
}

/// Promotional price statistics for a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromoInfo {
    pub has_promo: bool,
    pub min_price: BigDecimal,
    pub max_price: BigDecimal,
    pub avg_price: BigDecimal,
    pub current_price: BigDecimal,
    /// (max - min) / avg, as a percentage
    pub price_variance_pct: f64,
    /// More units were bought at the lowest price than at the highest
    pub bulk_at_discount: bool,
    pub savings_per_unit: BigDecimal,
    pub savings_pct: f64,
    pub stock_up_qty: u32,
    pub avg_qty: f64,
    pub price_count: usize,
    pub best_days: Vec<Weekday>,
    /// Week of month (1 = days 1-7, 5 = days 29-31)
    pub best_weeks: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StockSource {
    /// Projected from a counted stock snapshot
    Snapshot,
    /// Last-order depletion model
    Estimated,
}

/// Consumption model of one product at planning start
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub daily_rate: f64,
    pub weekly_need: f64,
    pub avg_interval: Option<f64>,
    pub avg_qty_per_order: f64,
    pub frequent: bool,
    pub max_per_order: u32,
    pub unit_price: BigDecimal,
    pub estimated_stock: f64,
    pub days_until_empty: f64,
    pub order_count: usize,
    pub last_order_date: NaiveDate,
    pub last_order_qty: f64,
    pub days_since_last_order: i64,
    pub stock_source: StockSource,
    pub promo: Option<PromoInfo>,
}

impl ProductStats {
    pub fn has_promo(&self) -> bool {
        self.promo.as_ref().map_or(false, |p| p.has_promo)
    }

    /// Lowest observed price, falling back to the latest price
    pub fn min_price(&self) -> &BigDecimal {
        self.promo
            .as_ref()
            .map(|p| &p.min_price)
            .unwrap_or(&self.unit_price)
    }
}
