pub mod handlers;

pub use handlers::{health_check, plan, plan_extracted, PlanRequest, PlanResponse};

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::service::PlannerService;

pub fn router(service: Arc<PlannerService>) -> Router {
    let plan_routes = Router::new()
        .route("/api/plan", post(plan))
        .route("/api/plan/extracted", post(plan_extracted))
        .with_state(service);

    Router::new()
        .route("/health", get(health_check))
        .merge(plan_routes)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
}
