use chrono::NaiveDate;
use clap::Parser;
use replenish_planner::store::{export_plan_csv, load_extracted_invoices, load_stock_snapshot};
use replenish_planner::{AppConfig, PlanOutcome, PlannerService};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Plan upcoming grocery orders from extracted invoice data
#[derive(Parser, Debug)]
#[command(name = "plan-orders", version, about)]
struct Args {
    /// Extracted invoice document (JSON array)
    #[arg(short, long, default_value = "output/extracted_data.json")]
    invoices: PathBuf,

    /// Optional in-stock snapshot (JSON)
    #[arg(short, long, default_value = "output/in-stock.json")]
    stock: PathBuf,

    /// Configuration file (TOML)
    #[arg(short, long, default_value = "planner.toml")]
    config: PathBuf,

    /// Plan as of this date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    as_of: Option<NaiveDate>,

    /// Write the plan as CSV to this path instead of printing JSON
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = AppConfig::load(&args.config)?;

    let invoices = load_extracted_invoices(&args.invoices)?;
    let stock = load_stock_snapshot(&args.stock);
    let as_of = args.as_of.unwrap_or_else(|| chrono::Local::now().date_naive());

    let service = PlannerService::new(config.planner);
    let outcome = service.plan(&invoices, stock.as_ref(), as_of);

    match (&outcome, &args.csv) {
        (PlanOutcome::Planned(report), Some(path)) => {
            export_plan_csv(&report.orders, path)?;
            info!(
                "{} orders placed, total ${} ({} below minimum)",
                report.summary.orders_placed, report.summary.total_spend, report.summary.orders_below_minimum
            );
        }
        (PlanOutcome::NothingToPlan(reason), Some(_)) => {
            info!("Nothing to plan: {}, no CSV written", reason.message());
        }
        (_, None) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }

    Ok(())
}
