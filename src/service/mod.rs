pub mod builder;
pub mod calendar;
pub mod consumption;
pub mod history;
pub mod minimums;
pub mod name_match;
pub mod planner;
pub mod price_patterns;

pub use consumption::ConsumptionEstimator;
pub use history::PurchaseHistory;
pub use name_match::{ProductMatcher, TokenSubsetMatcher};
pub use planner::PlannerService;
