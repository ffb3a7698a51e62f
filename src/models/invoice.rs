use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A purchase line on an invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceLine {
    pub product: String,
    pub quantity: BigDecimal,
    pub unit_price: BigDecimal,
}

/// A parsed invoice as handed over by the ingestor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    /// `None` when absent or not a `YYYY-MM-DD` date; such records are dropped
    #[serde(default, deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    pub items: Vec<InvoiceLine>,
}

impl InvoiceRecord {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            items: Vec::new(),
        }
    }

    pub fn add_item(&mut self, product: impl Into<String>, quantity: BigDecimal, unit_price: BigDecimal) {
        self.items.push(InvoiceLine {
            product: product.into(),
            quantity,
            unit_price,
        });
    }

    /// Builder-style variant of [`add_item`](Self::add_item)
    pub fn with_item(mut self, product: impl Into<String>, quantity: BigDecimal, unit_price: BigDecimal) -> Self {
        self.add_item(product, quantity, unit_price);
        self
    }
}

/// Raw invoice document produced by the extraction step (all fields are text)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedInvoice {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub invoice_number: Option<String>,
    #[serde(default)]
    pub invoice_date: Option<String>,
    #[serde(default)]
    pub categories: Vec<ExtractedCategory>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedCategory {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub items: Vec<ExtractedItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedItem {
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub ordered: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub unit_price: Option<String>,
    #[serde(default, deserialize_with = "text_or_number")]
    pub total_price: Option<String>,
}

/// Reads a date without failing the whole document on a bad value.
fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    })
}

/// Accepts `"2"`, `2`, `2.5` or `null` for numeric text fields.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreadable_invoice_date_becomes_none() {
        let records: Vec<InvoiceRecord> = serde_json::from_str(
            r#"[
                {"date": "2025-01-06", "items": [{"product": "Milk", "quantity": "1", "unit_price": "3.10"}]},
                {"date": "6th of January", "items": []},
                {"date": 20250106, "items": []},
                {"items": []}
            ]"#,
        )
        .unwrap();

        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 1, 6));
        assert_eq!(records[0].items.len(), 1);
        assert!(records[1..].iter().all(|r| r.date.is_none()));
    }
}
