use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{PlanResult, PlannerError};

/// Upper bound on `planning_horizon_days` (ten years)
pub const MAX_PLANNING_HORIZON_DAYS: i64 = 3650;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// How the order builder sizes a restock line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchSizing {
    /// Order exactly the (rounded up) shortfall
    CoverShortfall,
    /// Order the usual basket size, or the cap when the shortfall is larger
    TypicalBatch,
}

/// Merchant rules and planning knobs for one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub minimum_order_value: BigDecimal,
    pub delivery_fee: BigDecimal,
    /// Monday = 0 ... Sunday = 6
    pub order_day_offsets: Vec<u32>,
    pub orders_per_week: usize,
    pub planning_horizon_days: i64,
    pub recent_single_order_days: i64,
    pub min_weekly_need: f64,
    pub last_order_buffer_days: i64,
    pub batch_sizing: BatchSizing,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            minimum_order_value: BigDecimal::from(50),
            delivery_fee: BigDecimal::from(2),
            // Tuesday, Saturday
            order_day_offsets: vec![1, 5],
            orders_per_week: 2,
            planning_horizon_days: 30,
            recent_single_order_days: 30,
            min_weekly_need: 0.25,
            last_order_buffer_days: 3,
            batch_sizing: BatchSizing::CoverShortfall,
        }
    }
}

impl PlannerConfig {
    /// Weekday offsets actually used by the calendar
    pub fn cadence(&self) -> &[u32] {
        let n = self.orders_per_week.min(self.order_day_offsets.len());
        &self.order_day_offsets[..n]
    }

    pub fn validate(&self) -> PlanResult<()> {
        if self.orders_per_week == 0 {
            return Err(PlannerError::InvalidConfig("orders_per_week must be at least 1".into()));
        }
        if self.order_day_offsets.is_empty() {
            return Err(PlannerError::InvalidConfig("order_day_offsets must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for &offset in &self.order_day_offsets {
            if offset > 6 {
                return Err(PlannerError::InvalidConfig(format!(
                    "order day offset {} is not a weekday (0..=6)",
                    offset
                )));
            }
            if !seen.insert(offset) {
                return Err(PlannerError::InvalidConfig(format!("duplicate order day offset {}", offset)));
            }
        }
        if !(1..=MAX_PLANNING_HORIZON_DAYS).contains(&self.planning_horizon_days) {
            return Err(PlannerError::InvalidConfig(format!(
                "planning_horizon_days must be between 1 and {}",
                MAX_PLANNING_HORIZON_DAYS
            )));
        }
        if self.minimum_order_value < BigDecimal::zero() || self.delivery_fee < BigDecimal::zero() {
            return Err(PlannerError::InvalidConfig("money values must not be negative".into()));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Loads `planner.toml` (if present) overlaid with `PLANNER__*` environment variables
    pub fn from_env() -> PlanResult<Self> {
        Self::load("planner.toml")
    }

    /// Defaults, then the optional file at `path`, then the environment
    pub fn load(path: impl AsRef<Path>) -> PlanResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path.as_ref()).required(false))
            .add_source(
                config::Environment::with_prefix("PLANNER")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?;

        let app: AppConfig = settings.try_deserialize()?;
        app.planner.validate()?;
        Ok(app)
    }
}
