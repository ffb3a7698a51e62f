pub mod invoice;
pub mod order;
pub mod plan;
pub mod product;
pub mod stock;

pub use invoice::{ExtractedCategory, ExtractedInvoice, ExtractedItem, InvoiceLine, InvoiceRecord};
pub use order::{Order, OrderItem};
pub use plan::{NothingToPlan, PlanOutcome, PlanReport, PlanSummary};
pub use product::{PriceHistoryEntry, ProductStats, PromoInfo, StockSource};
pub use stock::{StockCount, StockSnapshot};
