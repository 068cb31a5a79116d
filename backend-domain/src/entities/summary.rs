// Report summaries
// Metric sets computed from one window of sales rows

use rust_decimal::Decimal;
use serde::Serialize;

use crate::value_objects::{ReportKind, ReportWindow};

/// A labelled leader such as the top branch or the best day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked<T> {
    pub label: String,
    pub value: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: Decimal,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: Decimal) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub window: ReportWindow,
    pub total_sales: Decimal,
    pub total_units: i64,
    pub transactions: usize,
    pub average_ticket: Decimal,
    pub top_payment_mode: Option<String>,
    pub top_branch: Option<Ranked<Decimal>>,
    pub top_product: Option<Ranked<i64>>,
    pub previous_total: Decimal,
    pub growth_percent: Option<Decimal>,
    pub sales_by_hour: Vec<SeriesPoint>,
    pub sales_by_branch: Vec<SeriesPoint>,
    pub sales_by_payment_mode: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklySummary {
    pub window: ReportWindow,
    pub total_sales: Decimal,
    pub total_units: i64,
    pub transactions: usize,
    pub average_daily_sales: Decimal,
    pub best_day: Option<Ranked<Decimal>>,
    pub busiest_day: Option<Ranked<usize>>,
    pub top_branch: Option<Ranked<Decimal>>,
    pub top_product: Option<Ranked<i64>>,
    pub previous_total: Decimal,
    pub growth_percent: Option<Decimal>,
    pub sales_by_weekday: Vec<SeriesPoint>,
    pub sales_by_branch: Vec<SeriesPoint>,
    pub daily_evolution: Vec<SeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ReportSummary {
    Daily(DailySummary),
    Weekly(WeeklySummary),
}

impl ReportSummary {
    pub fn kind(&self) -> ReportKind {
        match self {
            ReportSummary::Daily(_) => ReportKind::Daily,
            ReportSummary::Weekly(_) => ReportKind::Weekly,
        }
    }

    pub fn window(&self) -> &ReportWindow {
        match self {
            ReportSummary::Daily(summary) => &summary.window,
            ReportSummary::Weekly(summary) => &summary.window,
        }
    }

    pub fn total_sales(&self) -> Decimal {
        match self {
            ReportSummary::Daily(summary) => summary.total_sales,
            ReportSummary::Weekly(summary) => summary.total_sales,
        }
    }
}
