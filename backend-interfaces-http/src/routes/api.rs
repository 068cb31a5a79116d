use axum::routing::{get, post};
use axum::Router;

use backend_application::AppState;

use crate::handlers::{ops_handlers, report_handlers};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/reports/daily", post(report_handlers::daily_report))
        .route("/reports/weekly", post(report_handlers::weekly_report))
        .route("/ops/health/live", get(ops_handlers::health_live))
        .route("/ops/health/ready", get(ops_handlers::health_ready))
        .route(
            "/ops/metrics/prometheus",
            get(ops_handlers::metrics_prometheus),
        )
        .fallback(ops_handlers::not_found)
        .with_state(state)
}
