use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::entities::SaleRecord;
use crate::value_objects::ReportWindow;

#[async_trait]
pub trait SalesRepository: Send + Sync {
    async fn fetch_sales(&self, window: &ReportWindow) -> anyhow::Result<Vec<SaleRecord>>;
    async fn fetch_total_sales(&self, window: &ReportWindow) -> anyhow::Result<Decimal>;
    async fn ping(&self) -> anyhow::Result<()>;
}
