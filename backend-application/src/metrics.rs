use std::sync::atomic::{AtomicU64, Ordering};

use backend_domain::ReportKind;

#[derive(Debug, Default)]
struct ReportCounters {
    sent: AtomicU64,
    empty: AtomicU64,
    failed: AtomicU64,
}

#[derive(Debug, Default)]
pub struct Metrics {
    daily: ReportCounters,
    weekly: ReportCounters,
    rows_processed: AtomicU64,
    recipients: AtomicU64,
}

impl Metrics {
    fn counters(&self, kind: ReportKind) -> &ReportCounters {
        match kind {
            ReportKind::Daily => &self.daily,
            ReportKind::Weekly => &self.weekly,
        }
    }

    pub fn record_sent(&self, kind: ReportKind, rows: usize, recipients: usize) {
        self.counters(kind).sent.fetch_add(1, Ordering::Relaxed);
        self.rows_processed.fetch_add(rows as u64, Ordering::Relaxed);
        self.recipients
            .fetch_add(recipients as u64, Ordering::Relaxed);
    }

    pub fn record_empty(&self, kind: ReportKind) {
        self.counters(kind).empty.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self, kind: ReportKind) {
        self.counters(kind).failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent(&self, kind: ReportKind) -> u64 {
        self.counters(kind).sent.load(Ordering::Relaxed)
    }

    pub fn empty(&self, kind: ReportKind) -> u64 {
        self.counters(kind).empty.load(Ordering::Relaxed)
    }

    pub fn failed(&self, kind: ReportKind) -> u64 {
        self.counters(kind).failed.load(Ordering::Relaxed)
    }

    pub fn render_prometheus(&self) -> String {
        let mut out = String::new();
        out.push_str("# TYPE tally_reports_sent_total counter\n");
        for kind in [ReportKind::Daily, ReportKind::Weekly] {
            out.push_str(&format!(
                "tally_reports_sent_total{{kind=\"{}\"}} {}\n",
                kind,
                self.sent(kind)
            ));
        }
        out.push_str("# TYPE tally_reports_empty_total counter\n");
        for kind in [ReportKind::Daily, ReportKind::Weekly] {
            out.push_str(&format!(
                "tally_reports_empty_total{{kind=\"{}\"}} {}\n",
                kind,
                self.empty(kind)
            ));
        }
        out.push_str("# TYPE tally_reports_failed_total counter\n");
        for kind in [ReportKind::Daily, ReportKind::Weekly] {
            out.push_str(&format!(
                "tally_reports_failed_total{{kind=\"{}\"}} {}\n",
                kind,
                self.failed(kind)
            ));
        }
        out.push_str(&format!(
            "# TYPE tally_sale_rows_processed_total counter\n\
tally_sale_rows_processed_total {}\n\
# TYPE tally_report_recipients_total counter\n\
tally_report_recipients_total {}\n",
            self.rows_processed.load(Ordering::Relaxed),
            self.recipients.load(Ordering::Relaxed)
        ));
        out
    }
}
