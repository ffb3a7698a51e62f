use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One counted product in a stock snapshot. The name is usually a partial
/// product name ("milk full cream") matched against the purchase history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCount {
    pub product: String,
    #[serde(default)]
    pub quantity: f64,
}

/// Optional "what is in the pantry" snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    #[serde(default)]
    pub stock_date: Option<NaiveDate>,
    #[serde(default)]
    pub items: Vec<StockCount>,
}

impl StockSnapshot {
    pub fn new(stock_date: NaiveDate) -> Self {
        Self {
            stock_date: Some(stock_date),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, product: impl Into<String>, quantity: f64) -> Self {
        self.items.push(StockCount {
            product: product.into(),
            quantity,
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
