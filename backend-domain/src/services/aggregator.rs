use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Weekday};
use rust_decimal::Decimal;

use crate::entities::{DailySummary, Ranked, SaleRecord, SeriesPoint, WeeklySummary};
use crate::value_objects::ReportWindow;

const WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

pub fn total_sales(rows: &[SaleRecord]) -> Decimal {
    rows.iter().map(|row| row.price).sum()
}

pub fn total_units(rows: &[SaleRecord]) -> i64 {
    rows.iter().map(|row| row.quantity).sum()
}

/// Mean line value, zero for an empty slice.
pub fn average_ticket(rows: &[SaleRecord]) -> Decimal {
    if rows.is_empty() {
        return Decimal::ZERO;
    }
    (total_sales(rows) / Decimal::from(rows.len())).round_dp(2)
}

/// Percentage change from `previous` to `current`, two decimals.
/// `None` when there is no previous revenue to compare against.
pub fn growth_percent(current: Decimal, previous: Decimal) -> Option<Decimal> {
    if previous.is_zero() {
        return None;
    }
    Some(((current - previous) / previous * Decimal::ONE_HUNDRED).round_dp(2))
}

pub fn sum_by<K, F>(rows: &[SaleRecord], key: F) -> BTreeMap<K, Decimal>
where
    K: Ord,
    F: Fn(&SaleRecord) -> K,
{
    let mut sums = BTreeMap::new();
    for row in rows {
        *sums.entry(key(row)).or_insert(Decimal::ZERO) += row.price;
    }
    sums
}

pub fn units_by_product(rows: &[SaleRecord]) -> BTreeMap<String, i64> {
    let mut units = BTreeMap::new();
    for row in rows {
        *units.entry(row.product_key()).or_insert(0) += row.quantity;
    }
    units
}

/// Most frequent value; ties go to the smallest value.
pub fn mode<I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }
    leader(counts).map(|ranked| ranked.label)
}

/// Largest value in the map; ties go to the smallest key.
pub fn leader<V>(values: BTreeMap<String, V>) -> Option<Ranked<V>>
where
    V: Ord + Copy,
{
    let mut best: Option<Ranked<V>> = None;
    for (label, value) in values {
        let replace = best.as_ref().map_or(true, |current| value > current.value);
        if replace {
            best = Some(Ranked { label, value });
        }
    }
    best
}

/// Sums per key, largest first.
pub fn ranked_series(sums: BTreeMap<String, Decimal>) -> Vec<SeriesPoint> {
    let mut points = sums
        .into_iter()
        .map(|(label, value)| SeriesPoint { label, value })
        .collect::<Vec<_>>();
    points.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    points
}

pub fn sales_by_branch(rows: &[SaleRecord]) -> Vec<SeriesPoint> {
    ranked_series(sum_by(rows, |row| row.branch.trim().to_string()))
}

pub fn sales_by_payment_mode(rows: &[SaleRecord]) -> Vec<SeriesPoint> {
    ranked_series(sum_by(rows, |row| row.payment_mode.trim().to_string()))
}

/// Hourly sums from the first to the last trading hour, gaps filled with zero.
pub fn sales_by_hour(rows: &[SaleRecord]) -> Vec<SeriesPoint> {
    let sums = sum_by(rows, SaleRecord::hour);
    let (Some(first), Some(last)) = (
        sums.keys().next().copied(),
        sums.keys().next_back().copied(),
    ) else {
        return Vec::new();
    };
    (first..=last)
        .map(|hour| {
            SeriesPoint::new(
                format!("{hour:02}:00"),
                sums.get(&hour).copied().unwrap_or_default(),
            )
        })
        .collect()
}

/// Monday through Sunday, always seven points.
pub fn sales_by_weekday(rows: &[SaleRecord]) -> Vec<SeriesPoint> {
    let sums = sum_by(rows, |row| row.date().weekday().num_days_from_monday());
    WEEKDAYS
        .iter()
        .map(|weekday| {
            SeriesPoint::new(
                weekday_name(*weekday),
                sums.get(&weekday.num_days_from_monday())
                    .copied()
                    .unwrap_or_default(),
            )
        })
        .collect()
}

/// One sum per day of the window, zero for days without sales.
pub fn sales_by_day(rows: &[SaleRecord], window: &ReportWindow) -> Vec<(NaiveDate, Decimal)> {
    let sums = sum_by(rows, SaleRecord::date);
    window
        .days()
        .into_iter()
        .map(|day| (day, sums.get(&day).copied().unwrap_or_default()))
        .collect()
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

fn day_label(day: NaiveDate) -> String {
    format!("{} {}", weekday_name(day.weekday()), day.format("%d/%m/%Y"))
}

/// Day with the largest value; ties go to the earliest day.
fn leading_day<V, I>(days: I) -> Option<Ranked<V>>
where
    V: Ord + Copy,
    I: IntoIterator<Item = (NaiveDate, V)>,
{
    let mut best: Option<(NaiveDate, V)> = None;
    for (day, value) in days {
        let replace = best.map_or(true, |(best_day, best_value)| {
            value > best_value || (value == best_value && day < best_day)
        });
        if replace {
            best = Some((day, value));
        }
    }
    best.map(|(day, value)| Ranked {
        label: day_label(day),
        value,
    })
}

/// Mean of the per-day totals over the days that had at least one sale.
pub fn average_per_trading_day(total: Decimal, trading_days: usize) -> Decimal {
    if trading_days == 0 {
        return Decimal::ZERO;
    }
    (total / Decimal::from(trading_days)).round_dp(2)
}

fn in_window(rows: &[SaleRecord], window: &ReportWindow) -> Vec<SaleRecord> {
    rows.iter()
        .filter(|row| window.contains(row.date()))
        .cloned()
        .collect()
}

pub fn summarize_daily(
    window: ReportWindow,
    rows: &[SaleRecord],
    previous_total: Decimal,
) -> DailySummary {
    let rows = in_window(rows, &window);
    let total = total_sales(&rows);
    DailySummary {
        window,
        total_sales: total,
        total_units: total_units(&rows),
        transactions: rows.len(),
        average_ticket: average_ticket(&rows),
        top_payment_mode: mode(rows.iter().map(|row| row.payment_mode.trim().to_string())),
        top_branch: leader(sum_by(&rows, |row| row.branch.trim().to_string())),
        top_product: leader(units_by_product(&rows)),
        previous_total,
        growth_percent: growth_percent(total, previous_total),
        sales_by_hour: sales_by_hour(&rows),
        sales_by_branch: sales_by_branch(&rows),
        sales_by_payment_mode: sales_by_payment_mode(&rows),
    }
}

pub fn summarize_weekly(
    window: ReportWindow,
    rows: &[SaleRecord],
    previous_total: Decimal,
) -> WeeklySummary {
    let rows = in_window(rows, &window);
    let total = total_sales(&rows);
    let per_day = sales_by_day(&rows, &window);

    let best_day = if rows.is_empty() {
        None
    } else {
        leading_day(per_day.iter().copied())
    };

    let mut day_counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for row in &rows {
        *day_counts.entry(row.date()).or_insert(0) += 1;
    }
    let trading_days = day_counts.len();
    let busiest_day = leading_day(day_counts);

    WeeklySummary {
        window,
        total_sales: total,
        total_units: total_units(&rows),
        transactions: rows.len(),
        average_daily_sales: average_per_trading_day(total, trading_days),
        best_day,
        busiest_day,
        top_branch: leader(sum_by(&rows, |row| row.branch.trim().to_string())),
        top_product: leader(units_by_product(&rows)),
        previous_total,
        growth_percent: growth_percent(total, previous_total),
        sales_by_weekday: sales_by_weekday(&rows),
        sales_by_branch: sales_by_branch(&rows),
        daily_evolution: per_day
            .into_iter()
            .map(|(day, value)| SeriesPoint::new(day.format("%d/%m").to_string(), value))
            .collect(),
    }
}
