use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::ports::SalesRepository;
use backend_infrastructure::{
    build_mailer, readiness_timeout, AppConfig, ClickhouseSalesRepo, DefaultHealthService,
    HtmlReportComposer,
};

pub struct AppContext {
    pub state: AppState,
}

impl AppContext {
    pub async fn new() -> Result<Self> {
        let config = AppConfig::load().await?;
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();
        let mail_config = config.to_mail_config();

        let sales_repo = Arc::new(ClickhouseSalesRepo::from_config(&db_config));
        if let Err(err) = sales_repo.ping().await {
            warn!("sales store not reachable at startup: {:#}", err);
        }

        let mailer = build_mailer(&mail_config)?;
        match &mail_config.smtp_host {
            Some(host) => info!(
                "mailing reports via {}:{} to {} recipients",
                host,
                mail_config.smtp_port,
                mail_config.mail_recipients.len()
            ),
            None => warn!("smtp_host not set, reports will be logged instead of sent"),
        }

        let health = Arc::new(DefaultHealthService::new(
            sales_repo.clone(),
            readiness_timeout(runtime_config.request_timeout_seconds),
        ));

        let state = AppState {
            composer: Arc::new(HtmlReportComposer::new(runtime_config.currency_symbol.clone())),
            config: runtime_config,
            sales_repo,
            mailer,
            health,
            metrics: Arc::new(Metrics::default()),
        };

        Ok(Self { state })
    }
}
