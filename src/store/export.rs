use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::PlanResult;
use crate::models::Order;

const HEADER: [&str; 9] = [
    "order_date",
    "status",
    "product",
    "qty",
    "unit_price",
    "line_total",
    "topped_up",
    "items_total",
    "total_with_delivery",
];

fn order_status(order: &Order) -> &'static str {
    if order.skipped {
        "SKIPPED"
    } else if order.meets_minimum {
        "OK"
    } else {
        "BELOW_MIN"
    }
}

/// Writes a plan as CSV, one row per order line.
///
/// Skipped orders get a single row with an empty product. Empty orders that
/// were never filled are left out.
pub fn write_plan_csv<W: Write>(orders: &[Order], out: W) -> PlanResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(HEADER)?;

    for order in orders {
        let date = order.date.to_string();
        let status = order_status(order);

        if order.skipped {
            writer.write_record([
                date.as_str(),
                status,
                "",
                "",
                "",
                "",
                "",
                "0",
                "0",
            ])?;
            continue;
        }

        for item in &order.items {
            writer.write_record(&[
                date.clone(),
                status.to_string(),
                item.product.clone(),
                item.qty.to_string(),
                item.unit_price.to_string(),
                item.total_price.to_string(),
                item.topped_up.to_string(),
                order.items_total.to_string(),
                order.total_with_delivery.to_string(),
            ])?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Exports a plan to a CSV file at `output_path`
pub fn export_plan_csv(orders: &[Order], output_path: &Path) -> PlanResult<()> {
    let file = File::create(output_path)?;
    write_plan_csv(orders, file)?;
    tracing::info!("Exported {} orders to {}", orders.len(), output_path.display());
    Ok(())
}
