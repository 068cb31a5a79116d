use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::{AppError, AppState};
use backend_domain::{summarize_daily, summarize_weekly, ReportKind, ReportSummary, ReportWindow};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Sent {
        window: ReportWindow,
        rows: usize,
        recipients: usize,
        total_sales: Decimal,
    },
    NoData {
        window: ReportWindow,
    },
}

impl ReportOutcome {
    pub fn window(&self) -> &ReportWindow {
        match self {
            ReportOutcome::Sent { window, .. } => window,
            ReportOutcome::NoData { window } => window,
        }
    }
}

/// Runs fetch, aggregate, render and deliver for one report window.
///
/// `as_of` is the day the report is produced on; the window is derived from
/// it (yesterday, or the last complete week). Defaults to today, local time.
pub async fn generate_report(
    state: &AppState,
    kind: ReportKind,
    as_of: Option<NaiveDate>,
) -> Result<ReportOutcome, AppError> {
    let today = as_of.unwrap_or_else(|| Local::now().date_naive());
    let window = ReportWindow::for_kind(kind, today);
    let span = info_span!(
        "report",
        run_id = %Uuid::new_v4(),
        kind = %kind,
        period = %window.label()
    );

    let result = run_pipeline(state, window).instrument(span).await;
    match &result {
        Ok(ReportOutcome::Sent {
            rows, recipients, ..
        }) => state.metrics.record_sent(kind, *rows, *recipients),
        Ok(ReportOutcome::NoData { .. }) => state.metrics.record_empty(kind),
        Err(_) => state.metrics.record_failure(kind),
    }
    result
}

async fn run_pipeline(state: &AppState, window: ReportWindow) -> Result<ReportOutcome, AppError> {
    let rows = state
        .sales_repo
        .fetch_sales(&window)
        .await
        .map_err(AppError::stage("fetch sales"))?;
    if rows.is_empty() {
        info!("no sales rows in window, nothing sent");
        return Ok(ReportOutcome::NoData { window });
    }
    info!("fetched {} sales rows", rows.len());

    let previous_total = state
        .sales_repo
        .fetch_total_sales(&window.previous())
        .await
        .map_err(AppError::stage("fetch previous total"))?;

    let summary = match window.kind {
        ReportKind::Daily => ReportSummary::Daily(summarize_daily(window, &rows, previous_total)),
        ReportKind::Weekly => {
            ReportSummary::Weekly(summarize_weekly(window, &rows, previous_total))
        }
    };

    let email = state
        .composer
        .compose(&summary, &rows)
        .map_err(AppError::stage("render report"))?;

    let recipients = state
        .mailer
        .send(email)
        .await
        .map_err(AppError::stage("deliver report"))?;
    info!("report delivered to {} recipients", recipients);

    Ok(ReportOutcome::Sent {
        window,
        rows: rows.len(),
        recipients,
        total_sales: summary.total_sales(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::Weekday;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::Metrics;
    use backend_domain::ports::{HealthCheckService, ReportComposer, ReportMailer, SalesRepository};
    use backend_domain::{ReportEmail, RuntimeConfig, SaleRecord};

    struct FakeRepo {
        rows: Vec<SaleRecord>,
        previous_total: Decimal,
        fail: bool,
        fail_total: bool,
        windows: Mutex<Vec<ReportWindow>>,
    }

    #[async_trait]
    impl SalesRepository for FakeRepo {
        async fn fetch_sales(&self, window: &ReportWindow) -> anyhow::Result<Vec<SaleRecord>> {
            if self.fail {
                return Err(anyhow!("connection refused"));
            }
            self.windows.lock().expect("lock").push(*window);
            Ok(self.rows.clone())
        }

        async fn fetch_total_sales(&self, window: &ReportWindow) -> anyhow::Result<Decimal> {
            if self.fail_total {
                return Err(anyhow!("query timed out"));
            }
            self.windows.lock().expect("lock").push(*window);
            Ok(self.previous_total)
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    struct SubjectComposer;

    impl ReportComposer for SubjectComposer {
        fn compose(
            &self,
            summary: &ReportSummary,
            rows: &[SaleRecord],
        ) -> anyhow::Result<ReportEmail> {
            Ok(ReportEmail {
                subject: format!(
                    "{} {} rows={}",
                    summary.kind(),
                    summary.total_sales(),
                    rows.len()
                ),
                html: String::new(),
                inline_images: Vec::new(),
                attachments: Vec::new(),
            })
        }
    }

    struct BrokenComposer;

    impl ReportComposer for BrokenComposer {
        fn compose(&self, _: &ReportSummary, _: &[SaleRecord]) -> anyhow::Result<ReportEmail> {
            Err(anyhow!("chart has no points"))
        }
    }

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<ReportEmail>>,
        reject: bool,
    }

    #[async_trait]
    impl ReportMailer for RecordingMailer {
        async fn send(&self, email: ReportEmail) -> anyhow::Result<usize> {
            if self.reject {
                return Err(anyhow!("550 mailbox unavailable"));
            }
            self.sent.lock().expect("lock").push(email);
            Ok(2)
        }
    }

    struct AlwaysHealthy;

    #[async_trait]
    impl HealthCheckService for AlwaysHealthy {
        async fn check_database(&self) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    fn config() -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: "127.0.0.1:0".to_string(),
            api_token: Some("secret".to_string()),
            currency_symbol: "S/.".to_string(),
            max_body_bytes: 1024,
            request_timeout_seconds: 5,
            schedule_enabled: false,
            report_hour: 7,
            report_minute: 0,
            weekly_report_weekday: Weekday::Mon,
        }
    }

    fn sale(day: u32, price: Decimal) -> SaleRecord {
        SaleRecord {
            sold_at: NaiveDate::from_ymd_opt(2024, 6, day)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .expect("timestamp"),
            price,
            quantity: 1,
            payment_mode: "Cash".to_string(),
            branch: "Centro".to_string(),
            brand: String::new(),
            model: String::new(),
            size: String::new(),
            sku: "A1".to_string(),
        }
    }

    fn state(repo: Arc<FakeRepo>, mailer: Arc<RecordingMailer>) -> AppState {
        state_with(repo, Arc::new(SubjectComposer), mailer)
    }

    fn state_with(
        repo: Arc<FakeRepo>,
        composer: Arc<dyn ReportComposer>,
        mailer: Arc<RecordingMailer>,
    ) -> AppState {
        AppState {
            config: config(),
            sales_repo: repo,
            composer,
            mailer,
            health: Arc::new(AlwaysHealthy),
            metrics: Arc::new(Metrics::default()),
        }
    }

    fn repo(rows: Vec<SaleRecord>, fail: bool) -> Arc<FakeRepo> {
        Arc::new(FakeRepo {
            rows,
            previous_total: dec!(100),
            fail,
            fail_total: false,
            windows: Mutex::new(Vec::new()),
        })
    }

    fn internal_message(err: AppError) -> String {
        match err {
            AppError::Internal(inner) => format!("{inner:#}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    fn june(day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2024, 6, day)
    }

    #[tokio::test]
    async fn empty_window_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(repo(Vec::new(), false), mailer.clone());

        let outcome = generate_report(&state, ReportKind::Daily, june(5))
            .await
            .expect("report");

        assert!(matches!(outcome, ReportOutcome::NoData { .. }));
        assert_eq!(outcome.window().label(), "04/06/2024");
        assert!(mailer.sent.lock().expect("lock").is_empty());
        assert_eq!(state.metrics.empty(ReportKind::Daily), 1);
    }

    #[tokio::test]
    async fn weekly_report_queries_current_and_previous_week() {
        let mailer = Arc::new(RecordingMailer::default());
        let repo = repo(vec![sale(3, dec!(80)), sale(7, dec!(70))], false);
        let state = state(repo.clone(), mailer.clone());

        let outcome = generate_report(&state, ReportKind::Weekly, june(12))
            .await
            .expect("report");

        match outcome {
            ReportOutcome::Sent {
                window,
                rows,
                recipients,
                total_sales,
            } => {
                assert_eq!(window.label(), "03/06/2024 - 09/06/2024");
                assert_eq!(rows, 2);
                assert_eq!(recipients, 2);
                assert_eq!(total_sales, dec!(150));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let windows = repo.windows.lock().expect("lock").clone();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[1], windows[0].previous());

        let sent = mailer.sent.lock().expect("lock");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "weekly 150 rows=2");
        assert_eq!(state.metrics.sent(ReportKind::Weekly), 1);
    }

    #[tokio::test]
    async fn failing_stage_is_reported_as_internal_error() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state(repo(Vec::new(), true), mailer.clone());

        let err = generate_report(&state, ReportKind::Daily, june(5))
            .await
            .expect_err("fetch fails");

        match err {
            AppError::Internal(inner) => {
                let message = format!("{inner:#}");
                assert!(message.contains("fetch sales failed"));
                assert!(message.contains("connection refused"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(mailer.sent.lock().expect("lock").is_empty());
        assert_eq!(state.metrics.failed(ReportKind::Daily), 1);
    }

    #[tokio::test]
    async fn previous_total_failure_stops_before_rendering() {
        let mailer = Arc::new(RecordingMailer::default());
        let repo = Arc::new(FakeRepo {
            rows: vec![sale(4, dec!(50))],
            previous_total: dec!(100),
            fail: false,
            fail_total: true,
            windows: Mutex::new(Vec::new()),
        });
        let state = state(repo, mailer.clone());

        let err = generate_report(&state, ReportKind::Daily, june(5))
            .await
            .expect_err("previous total fails");

        let message = internal_message(err);
        assert!(message.contains("fetch previous total failed"));
        assert!(message.contains("query timed out"));
        assert!(mailer.sent.lock().expect("lock").is_empty());
        assert_eq!(state.metrics.failed(ReportKind::Daily), 1);
        assert_eq!(state.metrics.sent(ReportKind::Daily), 0);
    }

    #[tokio::test]
    async fn render_failure_sends_nothing() {
        let mailer = Arc::new(RecordingMailer::default());
        let state = state_with(
            repo(vec![sale(4, dec!(50))], false),
            Arc::new(BrokenComposer),
            mailer.clone(),
        );

        let err = generate_report(&state, ReportKind::Daily, june(5))
            .await
            .expect_err("render fails");

        let message = internal_message(err);
        assert!(message.contains("render report failed"));
        assert!(message.contains("chart has no points"));
        assert!(mailer.sent.lock().expect("lock").is_empty());
        assert_eq!(state.metrics.failed(ReportKind::Daily), 1);
        assert_eq!(state.metrics.sent(ReportKind::Daily), 0);
    }

    #[tokio::test]
    async fn rejected_delivery_counts_as_failure() {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
            reject: true,
        });
        let state = state(repo(vec![sale(3, dec!(80))], false), mailer.clone());

        let err = generate_report(&state, ReportKind::Weekly, june(12))
            .await
            .expect_err("delivery fails");

        let message = internal_message(err);
        assert!(message.contains("deliver report failed"));
        assert!(message.contains("550 mailbox unavailable"));
        assert_eq!(state.metrics.failed(ReportKind::Weekly), 1);
        assert_eq!(state.metrics.sent(ReportKind::Weekly), 0);
        assert_eq!(state.metrics.empty(ReportKind::Weekly), 0);
    }
}
