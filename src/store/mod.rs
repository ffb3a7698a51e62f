pub mod export;
pub mod loader;

pub use export::{export_plan_csv, write_plan_csv};
pub use loader::{load_extracted_invoices, load_stock_snapshot, parse_extracted};
