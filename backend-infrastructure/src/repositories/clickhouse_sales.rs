use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use clickhouse::Client;
use rust_decimal::Decimal;
use tracing::debug;

use backend_domain::{DbConfig, ReportWindow, SaleRecord, SaleRow, SalesRepository};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// `sold_at` as the shop's wall clock, tagged UTC so the decoded value and
/// the date filter read the same calendar day.
const LOCAL_SOLD_AT: &str = "toDateTime64(toString(sold_at), 3, 'UTC')";

/// Read-only access to the externally owned sales table.
#[derive(Clone)]
pub struct ClickhouseSalesRepo {
    client: Client,
    table: String,
}

impl ClickhouseSalesRepo {
    pub fn new(client: Client, table: String) -> Self {
        Self { client, table }
    }

    pub fn from_config(config: &DbConfig) -> Self {
        let mut client = Client::default()
            .with_url(&config.clickhouse_url)
            .with_database(&config.clickhouse_database);
        if let Some(user) = &config.clickhouse_user {
            client = client.with_user(user);
        }
        if let Some(password) = &config.clickhouse_password {
            client = client.with_password(password);
        }
        Self::new(client, config.sales_table.clone())
    }

    fn window_filter(window: &ReportWindow) -> String {
        format!(
            "toDate({}) BETWEEN toDate('{}') AND toDate('{}')",
            LOCAL_SOLD_AT,
            window.start.format(DATE_FORMAT),
            window.end.format(DATE_FORMAT)
        )
    }

    pub fn sales_query(&self, window: &ReportWindow) -> String {
        format!(
            "SELECT {} AS local_sold_at, toFloat64(price) AS price, \
             toInt64(quantity) AS quantity, payment_mode, branch, brand, model, size, sku \
             FROM {} WHERE {} ORDER BY local_sold_at",
            LOCAL_SOLD_AT,
            self.table,
            Self::window_filter(window)
        )
    }

    pub fn total_query(&self, window: &ReportWindow) -> String {
        format!(
            "SELECT toFloat64(sum(price)) FROM {} WHERE {}",
            self.table,
            Self::window_filter(window)
        )
    }
}

#[async_trait]
impl SalesRepository for ClickhouseSalesRepo {
    async fn fetch_sales(&self, window: &ReportWindow) -> Result<Vec<SaleRecord>> {
        let query = self.sales_query(window);
        debug!("fetching sales: {}", query);
        let rows = self.client.query(&query).fetch_all::<SaleRow>().await?;
        rows.into_iter()
            .map(SaleRecord::try_from)
            .collect::<Result<Vec<_>>>()
            .context("invalid sales row")
    }

    async fn fetch_total_sales(&self, window: &ReportWindow) -> Result<Decimal> {
        let query = self.total_query(window);
        debug!("fetching total: {}", query);
        let total: f64 = self.client.query(&query).fetch_one().await?;
        Decimal::from_f64_retain(total)
            .map(|value| value.round_dp(2))
            .ok_or_else(|| anyhow!("total sales {} is not representable", total))
    }

    async fn ping(&self) -> Result<()> {
        let _: u8 = self.client.query("SELECT toUInt8(1)").fetch_one().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn repo() -> ClickhouseSalesRepo {
        ClickhouseSalesRepo::new(Client::default(), "retail.sales".to_string())
    }

    #[test]
    fn sales_query_filters_on_inclusive_window() {
        let window = ReportWindow::weekly(NaiveDate::from_ymd_opt(2024, 6, 12).expect("date"));
        let query = repo().sales_query(&window);
        assert!(query.contains("FROM retail.sales"));
        assert!(query.starts_with(
            "SELECT toDateTime64(toString(sold_at), 3, 'UTC') AS local_sold_at,"
        ));
        assert!(query.contains(
            "WHERE toDate(toDateTime64(toString(sold_at), 3, 'UTC')) \
             BETWEEN toDate('2024-06-03') AND toDate('2024-06-09')"
        ));
        assert!(query.ends_with("ORDER BY local_sold_at"));
    }

    #[test]
    fn total_query_targets_previous_window() {
        let window = ReportWindow::daily(NaiveDate::from_ymd_opt(2024, 6, 12).expect("date"));
        let query = repo().total_query(&window.previous());
        assert!(query.starts_with("SELECT toFloat64(sum(price)) FROM retail.sales"));
        assert!(query.contains("toDate('2024-06-10') AND toDate('2024-06-10')"));
    }
}
