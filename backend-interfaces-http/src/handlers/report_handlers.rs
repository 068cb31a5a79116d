use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

use backend_application::{generate_report, AppState, ReportOutcome};
use backend_domain::ReportKind;

use crate::error::HttpError;
use crate::middleware::authorize;

const NO_DATA_MESSAGE: &str = "No sales data for the requested period.";

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    /// Day the report is produced on, `YYYY-MM-DD`. Defaults to today.
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub message: String,
    pub period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipients: Option<usize>,
}

impl ReportResponse {
    fn from_outcome(kind: ReportKind, outcome: ReportOutcome) -> Self {
        match outcome {
            ReportOutcome::Sent {
                window,
                rows,
                recipients,
                ..
            } => Self {
                message: format!("{} report sent.", capitalize(kind.as_str())),
                period: window.label(),
                rows: Some(rows),
                recipients: Some(recipients),
            },
            ReportOutcome::NoData { window } => Self {
                message: NO_DATA_MESSAGE.to_string(),
                period: window.label(),
                rows: None,
                recipients: None,
            },
        }
    }
}

pub async fn daily_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<ReportResponse>, HttpError> {
    run_report(&state, &headers, ReportKind::Daily, query).await
}

pub async fn weekly_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<ReportResponse>, HttpError> {
    run_report(&state, &headers, ReportKind::Weekly, query).await
}

async fn run_report(
    state: &AppState,
    headers: &HeaderMap,
    kind: ReportKind,
    query: Result<Query<ReportQuery>, QueryRejection>,
) -> Result<Json<ReportResponse>, HttpError> {
    if !authorize(&state.config, headers) {
        warn!("rejected unauthorized {} report request", kind);
        return Err(HttpError::Unauthorized);
    }
    let Query(query) = query.map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;
    let as_of = parse_date(query.date.as_deref())?;
    let outcome = generate_report(state, kind, as_of).await?;
    Ok(Json(ReportResponse::from_outcome(kind, outcome)))
}

fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, HttpError> {
    match value.map(str::trim).filter(|raw| !raw.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                HttpError::BadRequest(format!("invalid date '{}', expected YYYY-MM-DD", raw))
            }),
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::anyhow;
    use async_trait::async_trait;
    use axum::http::{header, HeaderValue, Uri};
    use chrono::Weekday;
    use rust_decimal::Decimal;

    use super::*;
    use backend_application::Metrics;
    use backend_domain::ports::{HealthCheckService, ReportComposer, ReportMailer, SalesRepository};
    use backend_domain::{ReportEmail, ReportSummary, ReportWindow, RuntimeConfig, SaleRecord};

    struct Fake {
        rows: Vec<SaleRecord>,
        fail: bool,
        windows: Mutex<Vec<ReportWindow>>,
    }

    #[async_trait]
    impl SalesRepository for Fake {
        async fn fetch_sales(&self, window: &ReportWindow) -> anyhow::Result<Vec<SaleRecord>> {
            if self.fail {
                return Err(anyhow!("database unavailable"));
            }
            self.windows.lock().expect("lock").push(*window);
            Ok(self.rows.clone())
        }

        async fn fetch_total_sales(&self, _: &ReportWindow) -> anyhow::Result<Decimal> {
            Ok(Decimal::ZERO)
        }

        async fn ping(&self) -> anyhow::Result<()> {
            Ok(())
        }
    }

    impl ReportComposer for Fake {
        fn compose(
            &self,
            summary: &ReportSummary,
            _: &[SaleRecord],
        ) -> anyhow::Result<ReportEmail> {
            Ok(ReportEmail {
                subject: summary.kind().title().to_string(),
                html: String::new(),
                inline_images: Vec::new(),
                attachments: Vec::new(),
            })
        }
    }

    #[async_trait]
    impl ReportMailer for Fake {
        async fn send(&self, _: ReportEmail) -> anyhow::Result<usize> {
            Ok(3)
        }
    }

    #[async_trait]
    impl HealthCheckService for Fake {
        async fn check_database(&self) -> anyhow::Result<bool> {
            Ok(true)
        }
    }

    fn sale() -> SaleRecord {
        SaleRecord {
            sold_at: NaiveDate::from_ymd_opt(2024, 6, 4)
                .and_then(|d| d.and_hms_opt(10, 0, 0))
                .expect("timestamp"),
            price: Decimal::new(2500, 2),
            quantity: 1,
            payment_mode: "Cash".to_string(),
            branch: "Centro".to_string(),
            brand: String::new(),
            model: String::new(),
            size: String::new(),
            sku: "A1".to_string(),
        }
    }

    fn state(rows: Vec<SaleRecord>, fail: bool) -> (AppState, Arc<Fake>) {
        let fake = Arc::new(Fake {
            rows,
            fail,
            windows: Mutex::new(Vec::new()),
        });
        let state = AppState {
            config: RuntimeConfig {
                bind_addr: "127.0.0.1:0".to_string(),
                api_token: Some("s3cret".to_string()),
                currency_symbol: "S/.".to_string(),
                max_body_bytes: 1024,
                request_timeout_seconds: 5,
                schedule_enabled: false,
                report_hour: 7,
                report_minute: 0,
                weekly_report_weekday: Weekday::Mon,
            },
            sales_repo: fake.clone(),
            composer: fake.clone(),
            mailer: fake.clone(),
            health: fake.clone(),
            metrics: Arc::new(Metrics::default()),
        };
        (state, fake)
    }

    fn authorized() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("s3cret"));
        headers
    }

    fn query(date: &str) -> Result<Query<ReportQuery>, QueryRejection> {
        Ok(Query(ReportQuery {
            date: Some(date.to_string()),
        }))
    }

    fn raw_query(uri: &str) -> Result<Query<ReportQuery>, QueryRejection> {
        Query::try_from_uri(&uri.parse::<Uri>().expect("uri"))
    }

    #[tokio::test]
    async fn daily_report_returns_period_and_counts() {
        let (state, fake) = state(vec![sale()], false);

        let Json(body) = daily_report(State(state), authorized(), query("2024-06-05"))
            .await
            .expect("report");

        assert_eq!(body.message, "Daily report sent.");
        assert_eq!(body.period, "04/06/2024");
        assert_eq!(body.rows, Some(1));
        assert_eq!(body.recipients, Some(3));
        let windows = fake.windows.lock().expect("lock");
        assert_eq!(windows[0].start, NaiveDate::from_ymd_opt(2024, 6, 4).expect("date"));
    }

    #[tokio::test]
    async fn empty_week_returns_no_data_message() {
        let (state, _) = state(Vec::new(), false);

        let Json(body) = weekly_report(State(state), authorized(), query("2024-06-12"))
            .await
            .expect("report");

        assert_eq!(body.message, NO_DATA_MESSAGE);
        assert_eq!(body.period, "03/06/2024 - 09/06/2024");
        let json = serde_json::to_value(&body).expect("json");
        assert!(json.get("rows").is_none());
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let (state, fake) = state(vec![sale()], false);

        let err = daily_report(State(state), HeaderMap::new(), Ok(Query(ReportQuery::default())))
            .await
            .expect_err("unauthorized");

        assert!(matches!(err, HttpError::Unauthorized));
        assert!(fake.windows.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn malformed_date_is_bad_request() {
        let (state, _) = state(vec![sale()], false);

        let err = daily_report(State(state), authorized(), query("05/06/2024"))
            .await
            .expect_err("bad date");

        assert!(matches!(err, HttpError::BadRequest(_)));
    }

    #[tokio::test]
    async fn pipeline_failure_is_internal_error() {
        let (state, _) = state(Vec::new(), true);

        let err = weekly_report(State(state), authorized(), query("2024-06-12"))
            .await
            .expect_err("failure");

        match err {
            HttpError::Internal(message) => assert!(message.contains("database unavailable")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn undecodable_query_is_bad_request_once_authorized() {
        let (state, fake) = state(vec![sale()], false);

        let err = daily_report(
            State(state),
            authorized(),
            raw_query("/reports/daily?date=2024-06-05&date=2024-06-06"),
        )
        .await
        .expect_err("duplicate date");

        assert!(matches!(err, HttpError::BadRequest(_)));
        assert!(fake.windows.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn undecodable_query_without_token_is_unauthorized() {
        let (state, _) = state(vec![sale()], false);

        let err = weekly_report(
            State(state),
            HeaderMap::new(),
            raw_query("/reports/weekly?date=2024-06-05&date=2024-06-06"),
        )
        .await
        .expect_err("unauthorized");

        assert!(matches!(err, HttpError::Unauthorized));
    }
}
