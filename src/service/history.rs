use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::models::{InvoiceRecord, PriceHistoryEntry};

/// Quantity of a product bought on one date (same-day lines summed)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DailyQuantity {
    pub date: NaiveDate,
    pub quantity: f64,
}

/// Latest known price of a product and the date it was observed
#[derive(Debug, Clone, PartialEq)]
pub struct LatestPrice {
    pub price: BigDecimal,
    pub date: NaiveDate,
}

/// Purchase history grouped per product, the shared input of the
/// price analyzer and the consumption estimator.
#[derive(Debug, Clone, Default)]
pub struct PurchaseHistory {
    /// product -> date-ascending purchases with quantity > 0
    pub orders: IndexMap<String, Vec<DailyQuantity>>,
    /// product -> priced observations (price > 0), date-ascending
    pub price_history: IndexMap<String, Vec<PriceHistoryEntry>>,
    pub latest_prices: IndexMap<String, LatestPrice>,
    /// Latest date of any dated invoice
    pub last_invoice_date: Option<NaiveDate>,
    pub dated_invoices: usize,
    pub undated_invoices: usize,
}

impl PurchaseHistory {
    pub fn from_invoices(invoices: &[InvoiceRecord]) -> Self {
        let mut grouped: IndexMap<String, BTreeMap<NaiveDate, f64>> = IndexMap::new();
        let mut history = PurchaseHistory::default();

        for invoice in invoices {
            let Some(date) = invoice.date else {
                history.undated_invoices += 1;
                continue;
            };
            history.dated_invoices += 1;

            if history.last_invoice_date.map_or(true, |last| date > last) {
                history.last_invoice_date = Some(date);
            }

            for line in &invoice.items {
                if line.product.is_empty() {
                    continue;
                }
                let quantity = line.quantity.to_f64().unwrap_or(0.0);

                if line.unit_price > BigDecimal::zero() {
                    history
                        .price_history
                        .entry(line.product.clone())
                        .or_default()
                        .push(PriceHistoryEntry {
                            date,
                            price: line.unit_price.clone(),
                            quantity,
                        });

                    let newer = history
                        .latest_prices
                        .get(&line.product)
                        .map_or(true, |latest| date > latest.date);
                    if newer {
                        history.latest_prices.insert(
                            line.product.clone(),
                            LatestPrice {
                                price: line.unit_price.clone(),
                                date,
                            },
                        );
                    }
                }

                if quantity > 0.0 {
                    *grouped
                        .entry(line.product.clone())
                        .or_default()
                        .entry(date)
                        .or_insert(0.0) += quantity;
                }
            }
        }

        for entries in history.price_history.values_mut() {
            entries.sort_by_key(|e| e.date);
        }

        for (product, by_date) in grouped {
            let rows: Vec<DailyQuantity> = by_date
                .into_iter()
                .map(|(date, quantity)| DailyQuantity { date, quantity })
                .collect();
            history.orders.insert(product, rows);
        }

        history
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn product_count(&self) -> usize {
        self.orders.len()
    }

    pub fn record_count(&self) -> usize {
        self.orders.values().map(Vec::len).sum()
    }

    pub fn latest_price(&self, product: &str) -> Option<&BigDecimal> {
        self.latest_prices.get(product).map(|p| &p.price)
    }
}
