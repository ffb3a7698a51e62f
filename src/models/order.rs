use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A line of a planned order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: String,
    pub qty: u32,
    pub unit_price: BigDecimal,
    pub total_price: BigDecimal,
    pub max_per_order: u32,
    /// Added only to reach the order minimum
    pub topped_up: bool,
    /// Projected stock when the line was scheduled (explanatory)
    pub stock_before: f64,
    /// Consumption expected before the next order date (explanatory)
    pub need_until_next: f64,
}

impl OrderItem {
    pub fn new(product: impl Into<String>, qty: u32, unit_price: BigDecimal, max_per_order: u32) -> Self {
        let total_price = &unit_price * BigDecimal::from(qty);
        Self {
            product: product.into(),
            qty,
            unit_price,
            total_price,
            max_per_order,
            topped_up: false,
            stock_before: 0.0,
            need_until_next: 0.0,
        }
    }

    pub fn set_qty(&mut self, qty: u32) {
        self.qty = qty;
        self.total_price = &self.unit_price * BigDecimal::from(qty);
    }
}

/// A planned order on one calendar date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub date: NaiveDate,
    pub items: Vec<OrderItem>,
    pub notes: Vec<String>,
    pub items_total: BigDecimal,
    pub total_with_delivery: BigDecimal,
    pub meets_minimum: bool,
    pub skipped: bool,
}

impl Order {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            items: Vec::new(),
            notes: Vec::new(),
            items_total: BigDecimal::zero(),
            total_with_delivery: BigDecimal::zero(),
            meets_minimum: false,
            skipped: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, product: &str) -> bool {
        self.items.iter().any(|i| i.product == product)
    }

    pub fn sum_items(&self) -> BigDecimal {
        self.items
            .iter()
            .fold(BigDecimal::zero(), |acc, i| acc + &i.total_price)
    }

    /// Recomputes `items_total`, `total_with_delivery` and `meets_minimum`.
    /// An empty order carries no delivery fee.
    pub fn recompute_totals(&mut self, minimum_order_value: &BigDecimal, delivery_fee: &BigDecimal) {
        self.items_total = self.sum_items();
        self.total_with_delivery = if self.items_total > BigDecimal::zero() {
            &self.items_total + delivery_fee
        } else {
            BigDecimal::zero()
        };
        self.meets_minimum = self.items_total >= *minimum_order_value;
    }

    /// Empties the order after its contents were merged elsewhere
    pub fn mark_skipped(&mut self) {
        self.items.clear();
        self.items_total = BigDecimal::zero();
        self.total_with_delivery = BigDecimal::zero();
        self.meets_minimum = false;
        self.skipped = true;
    }

    /// Placed orders are the ones that will actually be submitted
    pub fn is_placed(&self) -> bool {
        !self.skipped && !self.items.is_empty()
    }
}
