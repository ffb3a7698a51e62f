use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDate;
use std::path::Path;
use std::str::FromStr;

use crate::error::PlanResult;
use crate::models::{ExtractedInvoice, InvoiceRecord, StockSnapshot};

const DATE_FORMATS: [&str; 3] = ["%d %B %Y", "%Y-%m-%d", "%d/%m/%Y"];

/// Loads the extraction step's JSON document and converts it to invoice records
pub fn load_extracted_invoices(path: &Path) -> PlanResult<Vec<InvoiceRecord>> {
    let text = std::fs::read_to_string(path)?;
    let extracted: Vec<ExtractedInvoice> = serde_json::from_str(&text)?;
    let records = parse_extracted(&extracted);
    tracing::info!(
        "Loaded {} of {} invoices from {}",
        records.len(),
        extracted.len(),
        path.display()
    );
    Ok(records)
}

/// Converts raw extracted invoices into structured records.
///
/// Invoices without a parseable date are dropped. Unparseable quantities and
/// prices count as zero, so such lines still reach the history grouping.
pub fn parse_extracted(extracted: &[ExtractedInvoice]) -> Vec<InvoiceRecord> {
    let mut records = Vec::with_capacity(extracted.len());

    for invoice in extracted {
        let label = invoice
            .invoice_number
            .as_deref()
            .or(invoice.filename.as_deref())
            .unwrap_or("<unnamed>");

        let Some(date) = invoice.invoice_date.as_deref().and_then(parse_invoice_date) else {
            tracing::warn!(
                "Skipping invoice {}: unreadable date {:?}",
                label,
                invoice.invoice_date
            );
            continue;
        };

        let mut record = InvoiceRecord::new(date);
        for category in &invoice.categories {
            for item in &category.items {
                let Some(product) = item.product.as_deref().map(str::trim).filter(|p| !p.is_empty()) else {
                    continue;
                };
                let quantity = parse_quantity(item.ordered.as_deref());
                let unit_price = parse_price(item.unit_price.as_deref());
                record.add_item(product, quantity, unit_price);
            }
        }
        records.push(record);
    }

    records
}

/// Parses "17 December 2025", "2025-12-17" or "17/12/2025"
pub fn parse_invoice_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

pub fn parse_quantity(text: Option<&str>) -> BigDecimal {
    text.and_then(|t| BigDecimal::from_str(t.trim()).ok())
        .unwrap_or_else(BigDecimal::zero)
}

/// Parses "$1,234.50" style prices
pub fn parse_price(text: Option<&str>) -> BigDecimal {
    text.map(|t| t.trim().replace(['$', ','], ""))
        .and_then(|t| BigDecimal::from_str(&t).ok())
        .unwrap_or_else(BigDecimal::zero)
}

/// Loads the optional in-stock document.
///
/// The snapshot only refines stock estimates, so a missing, unreadable or
/// malformed file yields `None` and planning falls back to depletion estimates.
pub fn load_stock_snapshot(path: &Path) -> Option<StockSnapshot> {
    if !path.exists() {
        tracing::info!("No stock snapshot at {}, using estimated stock levels", path.display());
        return None;
    }
    match read_stock_snapshot(path) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            tracing::warn!(
                "Ignoring stock snapshot {}: {}, using estimated stock levels",
                path.display(),
                e
            );
            None
        }
    }
}

fn read_stock_snapshot(path: &Path) -> PlanResult<StockSnapshot> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const EXTRACTED: &str = r#"[
        {
            "filename": "invoice_1.pdf",
            "invoice_number": "INV-1",
            "invoice_date": "17 December 2025",
            "categories": [
                {"name": "Dairy", "items": [
                    {"product": "Milk 2L", "ordered": "2", "unit_price": "$3.50", "total_price": "$7.00"},
                    {"product": "Cheese Block", "ordered": 1, "unit_price": 9.5},
                    {"product": "Gift Card", "ordered": "n/a", "unit_price": "$1,050.00"}
                ]},
                {"name": "Other", "items": [
                    {"product": "  ", "ordered": "1", "unit_price": "$1.00"},
                    {"product": "Bag", "ordered": "1", "unit_price": null}
                ]}
            ]
        },
        {"invoice_date": "sometime", "categories": []},
        {"invoice_date": "2025-12-24", "categories": []}
    ]"#;

    #[test]
    fn test_parse_extracted_document() {
        let extracted: Vec<ExtractedInvoice> = serde_json::from_str(EXTRACTED).unwrap();
        let records = parse_extracted(&extracted);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date, Some(d(2025, 12, 17)));
        assert_eq!(records[1].date, Some(d(2025, 12, 24)));

        let items = &records[0].items;
        let names: Vec<&str> = items.iter().map(|i| i.product.as_str()).collect();
        assert_eq!(names, vec!["Milk 2L", "Cheese Block", "Gift Card", "Bag"]);
        assert_eq!(items[0].quantity, BigDecimal::from(2));
        assert_eq!(items[0].unit_price, BigDecimal::from_str("3.50").unwrap());
        assert_eq!(items[1].unit_price, BigDecimal::from_str("9.5").unwrap());
        assert_eq!(items[2].quantity, BigDecimal::zero());
        assert_eq!(items[2].unit_price, BigDecimal::from(1050));
        assert_eq!(items[3].unit_price, BigDecimal::zero());
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(parse_invoice_date("3 March 2025"), Some(d(2025, 3, 3)));
        assert_eq!(parse_invoice_date(" 2025-03-03 "), Some(d(2025, 3, 3)));
        assert_eq!(parse_invoice_date("03/04/2025"), Some(d(2025, 4, 3)));
        assert_eq!(parse_invoice_date("March 3rd"), None);
    }

    #[test]
    fn test_load_extracted_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(EXTRACTED.as_bytes()).unwrap();
        let records = load_extracted_invoices(file.path()).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        assert!(load_extracted_invoices(file.path()).is_err());
    }

    #[test]
    fn test_missing_stock_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_stock_snapshot(&dir.path().join("in-stock.json")).is_none());
    }

    #[test]
    fn test_load_stock_snapshot() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"stock_date": "2025-01-05", "items": [{"product": "milk", "quantity": 2}, {"product": "eggs"}]}"#,
        )
        .unwrap();

        let snapshot = load_stock_snapshot(file.path()).unwrap();
        assert_eq!(snapshot.stock_date, Some(d(2025, 1, 5)));
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.items[0].quantity, 2.0);
        assert_eq!(snapshot.items[1].quantity, 0.0);
    }

    #[test]
    fn test_malformed_stock_snapshot_falls_back_to_none() {
        let mut bad_date = tempfile::NamedTempFile::new().unwrap();
        bad_date
            .write_all(br#"{"stock_date": "20/12/2025", "items": [{"product": "milk", "quantity": 2}]}"#)
            .unwrap();
        assert!(load_stock_snapshot(bad_date.path()).is_none());

        let mut bad_quantity = tempfile::NamedTempFile::new().unwrap();
        bad_quantity
            .write_all(br#"{"stock_date": "2025-12-20", "items": [{"product": "milk", "quantity": "two"}]}"#)
            .unwrap();
        assert!(load_stock_snapshot(bad_quantity.path()).is_none());
    }
}
