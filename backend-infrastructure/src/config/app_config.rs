use std::env;
use std::path::Path;

use anyhow::{anyhow, Result};
use chrono::Weekday;
use serde::Deserialize;
use tokio::fs;
use tracing::warn;

use backend_domain::{DbConfig, MailConfig, RuntimeConfig};

use super::validation::{validate_mail_address, validate_table_name};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub sales_table: String,
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_timeout_seconds: u64,
    pub mail_from: String,
    pub mail_recipients: Vec<String>,
    pub currency_symbol: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub schedule_enabled: bool,
    pub report_hour: u32,
    pub report_minute: u32,
    pub weekly_report_weekday: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3240".to_string(),
            api_token: None,
            clickhouse_url: "http://127.0.0.1:8123".to_string(),
            clickhouse_database: "retail".to_string(),
            clickhouse_user: None,
            clickhouse_password: None,
            sales_table: "sales".to_string(),
            smtp_host: None,
            smtp_port: 587,
            smtp_user: None,
            smtp_password: None,
            smtp_timeout_seconds: 30,
            mail_from: String::new(),
            mail_recipients: Vec::new(),
            currency_symbol: "S/.".to_string(),
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 120,
            schedule_enabled: false,
            report_hour: 7,
            report_minute: 0,
            weekly_report_weekday: "monday".to_string(),
        }
    }
}

impl AppConfig {
    pub async fn load() -> Result<Self> {
        let path = env::var("TALLY_CONFIG").unwrap_or_else(|_| "./config.toml".to_string());
        let file_path = Path::new(&path);
        let mut config = if file_path.exists() {
            let content = fs::read_to_string(file_path).await?;
            toml::from_str::<AppConfig>(&content)?
        } else {
            warn!("{} not found, using defaults and environment", path);
            AppConfig::default()
        };
        config.apply_env_overrides();
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    pub fn normalize(&mut self) {
        normalize_optional(&mut self.api_token);
        normalize_optional(&mut self.clickhouse_user);
        normalize_optional(&mut self.clickhouse_password);
        normalize_optional(&mut self.smtp_host);
        normalize_optional(&mut self.smtp_user);
        normalize_optional(&mut self.smtp_password);
        self.sales_table = self.sales_table.trim().to_string();
        self.mail_from = self.mail_from.trim().to_string();
        self.mail_recipients = normalize_address_list(std::mem::take(&mut self.mail_recipients));
        if self.currency_symbol.trim().is_empty() {
            self.currency_symbol = AppConfig::default().currency_symbol;
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.bind_addr
            .parse::<std::net::SocketAddr>()
            .map_err(|err| anyhow!("invalid bind_addr: {}", err))?;
        validate_table_name(&self.sales_table)?;
        if self.max_body_bytes == 0 {
            return Err(anyhow!("max_body_bytes must be greater than 0"));
        }
        if self.report_hour > 23 || self.report_minute > 59 {
            return Err(anyhow!("report_hour or report_minute out of range"));
        }
        self.weekly_weekday()?;
        if self.smtp_host.is_some() {
            if self.mail_from.is_empty() {
                return Err(anyhow!("mail_from must be set when smtp_host is configured"));
            }
            if self.mail_recipients.is_empty() {
                return Err(anyhow!("mail_recipients must not be empty when smtp_host is configured"));
            }
        }
        for address in &self.mail_recipients {
            validate_mail_address(address)?;
        }
        if self.api_token.is_none() {
            warn!("api_token is not set, report endpoints will reject every request");
        }
        Ok(())
    }

    fn weekly_weekday(&self) -> Result<Weekday> {
        self.weekly_report_weekday
            .trim()
            .parse::<Weekday>()
            .map_err(|_| anyhow!("invalid weekly_report_weekday '{}'", self.weekly_report_weekday))
    }

    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            bind_addr: self.bind_addr.clone(),
            api_token: self.api_token.clone(),
            currency_symbol: self.currency_symbol.clone(),
            max_body_bytes: self.max_body_bytes,
            request_timeout_seconds: self.request_timeout_seconds,
            schedule_enabled: self.schedule_enabled,
            report_hour: self.report_hour,
            report_minute: self.report_minute,
            weekly_report_weekday: self.weekly_weekday().unwrap_or(Weekday::Mon),
        }
    }

    pub fn to_db_config(&self) -> DbConfig {
        DbConfig {
            clickhouse_url: self.clickhouse_url.clone(),
            clickhouse_database: self.clickhouse_database.clone(),
            clickhouse_user: self.clickhouse_user.clone(),
            clickhouse_password: self.clickhouse_password.clone(),
            sales_table: self.sales_table.clone(),
        }
    }

    pub fn to_mail_config(&self) -> MailConfig {
        MailConfig {
            smtp_host: self.smtp_host.clone(),
            smtp_port: self.smtp_port,
            smtp_user: self.smtp_user.clone(),
            smtp_password: self.smtp_password.clone(),
            mail_from: self.mail_from.clone(),
            mail_recipients: self.mail_recipients.clone(),
            smtp_timeout_seconds: self.smtp_timeout_seconds,
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = env::var("TALLY_BIND_ADDR") {
            self.bind_addr = value;
        }
        if let Ok(value) = env::var("TALLY_API_TOKEN") {
            self.api_token = Some(value);
        }
        if let Ok(value) = env::var("TALLY_CLICKHOUSE_URL") {
            self.clickhouse_url = value;
        }
        if let Ok(value) = env::var("TALLY_CLICKHOUSE_DATABASE") {
            self.clickhouse_database = value;
        }
        if let Ok(value) = env::var("TALLY_CLICKHOUSE_USER") {
            self.clickhouse_user = Some(value);
        }
        if let Ok(value) = env::var("TALLY_CLICKHOUSE_PASSWORD") {
            self.clickhouse_password = Some(value);
        }
        if let Ok(value) = env::var("TALLY_SALES_TABLE") {
            self.sales_table = value;
        }
        if let Ok(value) = env::var("TALLY_SMTP_HOST") {
            self.smtp_host = Some(value);
        }
        if let Ok(value) = env::var("TALLY_SMTP_PORT") {
            self.smtp_port = value.parse().unwrap_or(self.smtp_port);
        }
        if let Ok(value) = env::var("TALLY_SMTP_USER") {
            self.smtp_user = Some(value);
        }
        if let Ok(value) = env::var("TALLY_SMTP_PASSWORD") {
            self.smtp_password = Some(value);
        }
        if let Ok(value) = env::var("TALLY_SMTP_TIMEOUT_SECONDS") {
            self.smtp_timeout_seconds = value.parse().unwrap_or(self.smtp_timeout_seconds);
        }
        if let Ok(value) = env::var("TALLY_MAIL_FROM") {
            self.mail_from = value;
        }
        if let Ok(value) = env::var("TALLY_MAIL_RECIPIENTS") {
            self.mail_recipients = parse_env_list(&value);
        }
        if let Ok(value) = env::var("TALLY_CURRENCY_SYMBOL") {
            self.currency_symbol = value;
        }
        if let Ok(value) = env::var("TALLY_MAX_BODY_BYTES") {
            self.max_body_bytes = value.parse().unwrap_or(self.max_body_bytes);
        }
        if let Ok(value) = env::var("TALLY_REQUEST_TIMEOUT_SECONDS") {
            self.request_timeout_seconds = value.parse().unwrap_or(self.request_timeout_seconds);
        }
        if let Ok(value) = env::var("TALLY_SCHEDULE_ENABLED") {
            self.schedule_enabled = value.parse().unwrap_or(self.schedule_enabled);
        }
        if let Ok(value) = env::var("TALLY_REPORT_HOUR") {
            self.report_hour = value.parse().unwrap_or(self.report_hour);
        }
        if let Ok(value) = env::var("TALLY_REPORT_MINUTE") {
            self.report_minute = value.parse().unwrap_or(self.report_minute);
        }
        if let Ok(value) = env::var("TALLY_WEEKLY_REPORT_WEEKDAY") {
            self.weekly_report_weekday = value;
        }
    }
}

fn normalize_optional(value: &mut Option<String>) {
    *value = value
        .take()
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty());
}

fn parse_env_list(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(|item| item.trim())
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn normalize_address_list(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(values.len());
    for item in values {
        let trimmed = item.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.iter().any(|seen| seen.eq_ignore_ascii_case(trimmed)) {
            out.push(trimmed.to_string());
        }
    }
    out
}
