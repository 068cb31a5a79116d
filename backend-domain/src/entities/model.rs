use chrono::Weekday;

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub bind_addr: String,
    pub api_token: Option<String>,
    pub currency_symbol: String,
    pub max_body_bytes: u64,
    pub request_timeout_seconds: u64,
    pub schedule_enabled: bool,
    pub report_hour: u32,
    pub report_minute: u32,
    pub weekly_report_weekday: Weekday,
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub clickhouse_url: String,
    pub clickhouse_database: String,
    pub clickhouse_user: Option<String>,
    pub clickhouse_password: Option<String>,
    pub sales_table: String,
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub mail_from: String,
    pub mail_recipients: Vec<String>,
    pub smtp_timeout_seconds: u64,
}
