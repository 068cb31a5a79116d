use async_trait::async_trait;

use crate::entities::{ReportEmail, ReportSummary, SaleRecord};

/// Renders charts, body and attachments for one report.
pub trait ReportComposer: Send + Sync {
    fn compose(&self, summary: &ReportSummary, rows: &[SaleRecord]) -> anyhow::Result<ReportEmail>;
}

#[async_trait]
pub trait ReportMailer: Send + Sync {
    /// Delivers the email and returns how many recipients it was addressed to.
    async fn send(&self, email: ReportEmail) -> anyhow::Result<usize>;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
}
