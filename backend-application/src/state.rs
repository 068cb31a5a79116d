use std::sync::Arc;

use backend_domain::ports::{HealthCheckService, ReportComposer, ReportMailer, SalesRepository};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub sales_repo: Arc<dyn SalesRepository>,
    pub composer: Arc<dyn ReportComposer>,
    pub mailer: Arc<dyn ReportMailer>,
    pub health: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}
