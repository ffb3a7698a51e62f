pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

pub use config::{AppConfig, PlannerConfig};
pub use error::{PlanResult, PlannerError};
pub use models::{PlanOutcome, PlanReport};
pub use service::PlannerService;
