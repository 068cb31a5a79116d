use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backend_domain::ports::{HealthCheckService, SalesRepository};

const MAX_READINESS_TIMEOUT: Duration = Duration::from_secs(2);
const MIN_READINESS_TIMEOUT: Duration = Duration::from_millis(250);

/// Ping budget for the readiness check: half the request timeout, kept
/// between 250ms and 2s so a stalled store answers 503 before the
/// request layer gives up.
pub fn readiness_timeout(request_timeout_seconds: u64) -> Duration {
    (Duration::from_secs(request_timeout_seconds) / 2)
        .clamp(MIN_READINESS_TIMEOUT, MAX_READINESS_TIMEOUT)
}

pub struct DefaultHealthService {
    sales_repo: Arc<dyn SalesRepository>,
    timeout: Duration,
}

impl DefaultHealthService {
    pub fn new(sales_repo: Arc<dyn SalesRepository>, timeout: Duration) -> Self {
        Self {
            sales_repo,
            timeout,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        match tokio::time::timeout(self.timeout, self.sales_repo.ping()).await {
            Ok(result) => result.map(|_| true),
            Err(_) => Ok(false),
        }
    }
}
