use chrono::{Datelike, Duration, Local, NaiveDateTime};
use tracing::{error, info};

use backend_application::{generate_report, AppState, ReportOutcome};
use backend_domain::{ReportKind, RuntimeConfig};

/// Sends the daily report every day at `report_hour:report_minute` local
/// time, plus the weekly report on `weekly_report_weekday`. Returns at once
/// when the schedule is disabled.
pub async fn schedule_reports(state: AppState) {
    if !state.config.schedule_enabled {
        return;
    }
    info!(
        "report schedule enabled: daily at {:02}:{:02}, weekly on {}",
        state.config.report_hour, state.config.report_minute, state.config.weekly_report_weekday
    );

    loop {
        let now = Local::now().naive_local();
        let Some(next) = next_report_time(&state.config, now) else {
            error!("report schedule time is invalid, scheduler stopped");
            return;
        };
        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;

        for kind in due_reports(&state.config, next) {
            match generate_report(&state, kind, Some(next.date())).await {
                Ok(ReportOutcome::Sent { window, recipients, .. }) => info!(
                    "scheduled {} report for {} sent to {} recipients",
                    kind,
                    window.label(),
                    recipients
                ),
                Ok(ReportOutcome::NoData { window }) => {
                    info!("scheduled {} report for {} had no data", kind, window.label())
                }
                Err(err) => error!("scheduled {} report failed: {}", kind, err),
            }
        }
    }
}

/// First `report_hour:report_minute` strictly after `now`.
fn next_report_time(config: &RuntimeConfig, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let today = now
        .date()
        .and_hms_opt(config.report_hour, config.report_minute, 0)?;
    if today > now {
        Some(today)
    } else {
        today.checked_add_signed(Duration::days(1))
    }
}

fn due_reports(config: &RuntimeConfig, at: NaiveDateTime) -> Vec<ReportKind> {
    let mut kinds = vec![ReportKind::Daily];
    if at.date().weekday() == config.weekly_report_weekday {
        kinds.push(ReportKind::Weekly);
    }
    kinds
}
