// Report window value object
// Inclusive date range a report aggregates over

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use super::ReportKind;

const LABEL_FORMAT: &str = "%d/%m/%Y";
const STEM_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub kind: ReportKind,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ReportWindow {
    pub fn for_kind(kind: ReportKind, today: NaiveDate) -> Self {
        match kind {
            ReportKind::Daily => Self::daily(today),
            ReportKind::Weekly => Self::weekly(today),
        }
    }

    /// The calendar day before `today`.
    pub fn daily(today: NaiveDate) -> Self {
        let day = today - Duration::days(1);
        Self {
            kind: ReportKind::Daily,
            start: day,
            end: day,
        }
    }

    /// The last complete Monday to Sunday week that ends before `today`.
    pub fn weekly(today: NaiveDate) -> Self {
        // A Sunday `today` is still in progress, so it steps back a full week.
        let back = i64::from(today.weekday().num_days_from_sunday());
        let back = if back == 0 { 7 } else { back };
        let end = today - Duration::days(back);
        Self {
            kind: ReportKind::Weekly,
            start: end - Duration::days(6),
            end,
        }
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// The adjacent window of equal length immediately before this one.
    pub fn previous(&self) -> Self {
        let span = Duration::days(self.len_days());
        Self {
            kind: self.kind,
            start: self.start - span,
            end: self.end - span,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn days(&self) -> Vec<NaiveDate> {
        self.start
            .iter_days()
            .take_while(|day| *day <= self.end)
            .collect()
    }

    pub fn label(&self) -> String {
        if self.start == self.end {
            self.start.format(LABEL_FORMAT).to_string()
        } else {
            format!(
                "{} - {}",
                self.start.format(LABEL_FORMAT),
                self.end.format(LABEL_FORMAT)
            )
        }
    }

    /// Filesystem-safe form of the window used in attachment names.
    pub fn file_stem(&self) -> String {
        format!(
            "{}_to_{}",
            self.start.format(STEM_FORMAT),
            self.end.format(STEM_FORMAT)
        )
    }
}
