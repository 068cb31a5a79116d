use anyhow::{Context, Result};
use rust_decimal::Decimal;

use backend_domain::ports::ReportComposer;
use backend_domain::{
    DailySummary, EmailAttachment, InlineImage, Ranked, ReportEmail, ReportSummary, ReportWindow,
    SaleRecord, SeriesPoint, WeeklySummary,
};

use super::chart_service::{render_chart, ChartKind, ChartSpec};
use super::format::{escape_markup, format_count, format_money, format_percent};

const SVG_CONTENT_TYPE: &str = "image/svg+xml";
const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const CSV_HEADER: [&str; 9] = [
    "sold_at",
    "price",
    "quantity",
    "payment_mode",
    "branch",
    "brand",
    "model",
    "size",
    "sku",
];

/// Builds the report email: HTML body, inline SVG charts and the CSV detail.
#[derive(Debug, Clone)]
pub struct HtmlReportComposer {
    currency_symbol: String,
}

impl HtmlReportComposer {
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    fn money(&self, value: Decimal) -> String {
        format_money(&self.currency_symbol, value)
    }

    fn daily_sections<'a>(
        &self,
        summary: &'a DailySummary,
    ) -> (Vec<Card>, Vec<String>, Vec<Chart<'a>>) {
        let cards = vec![
            Card::new("Total sales", self.money(summary.total_sales)),
            Card::new("Units sold", format_count(summary.total_units)),
            Card::new("Transactions", format_count(summary.transactions as i64)),
            Card::new("Average ticket", self.money(summary.average_ticket)),
        ];

        let mut highlights = vec![growth_line(
            summary.growth_percent,
            &self.money(summary.previous_total),
            "previous day",
        )];
        if let Some(mode) = &summary.top_payment_mode {
            highlights.push(format!(
                "Most used payment method: <strong>{}</strong>",
                escape_markup(mode)
            ));
        }
        if let Some(branch) = &summary.top_branch {
            highlights.push(self.branch_line(branch));
        }
        if let Some(product) = &summary.top_product {
            highlights.push(product_line(product));
        }

        let charts = vec![
            Chart {
                content_id: "sales_by_hour.svg",
                kind: ChartKind::Bars,
                title: "Sales by hour",
                points: &summary.sales_by_hour,
            },
            Chart {
                content_id: "sales_by_branch.svg",
                kind: ChartKind::HorizontalBars,
                title: "Sales by branch",
                points: &summary.sales_by_branch,
            },
            Chart {
                content_id: "sales_by_payment_mode.svg",
                kind: ChartKind::Bars,
                title: "Sales by payment method",
                points: &summary.sales_by_payment_mode,
            },
        ];

        (cards, highlights, charts)
    }

    fn weekly_sections<'a>(
        &self,
        summary: &'a WeeklySummary,
    ) -> (Vec<Card>, Vec<String>, Vec<Chart<'a>>) {
        let cards = vec![
            Card::new("Total sales", self.money(summary.total_sales)),
            Card::new("Units sold", format_count(summary.total_units)),
            Card::new("Transactions", format_count(summary.transactions as i64)),
            Card::new("Average per day", self.money(summary.average_daily_sales)),
        ];

        let mut highlights = vec![growth_line(
            summary.growth_percent,
            &self.money(summary.previous_total),
            "previous week",
        )];
        if let Some(day) = &summary.best_day {
            highlights.push(format!(
                "Best day: <strong>{}</strong> with {}",
                escape_markup(&day.label),
                self.money(day.value)
            ));
        }
        if let Some(day) = &summary.busiest_day {
            highlights.push(format!(
                "Busiest day: <strong>{}</strong> with {} transactions",
                escape_markup(&day.label),
                format_count(day.value as i64)
            ));
        }
        if let Some(branch) = &summary.top_branch {
            highlights.push(self.branch_line(branch));
        }
        if let Some(product) = &summary.top_product {
            highlights.push(product_line(product));
        }

        let charts = vec![
            Chart {
                content_id: "sales_by_weekday.svg",
                kind: ChartKind::Bars,
                title: "Sales by weekday",
                points: &summary.sales_by_weekday,
            },
            Chart {
                content_id: "sales_by_branch.svg",
                kind: ChartKind::HorizontalBars,
                title: "Sales by branch",
                points: &summary.sales_by_branch,
            },
            Chart {
                content_id: "daily_evolution.svg",
                kind: ChartKind::Line,
                title: "Daily evolution",
                points: &summary.daily_evolution,
            },
        ];

        (cards, highlights, charts)
    }

    fn branch_line(&self, branch: &Ranked<Decimal>) -> String {
        format!(
            "Top branch: <strong>{}</strong> with {}",
            escape_markup(&branch.label),
            self.money(branch.value)
        )
    }
}

impl ReportComposer for HtmlReportComposer {
    fn compose(&self, summary: &ReportSummary, rows: &[SaleRecord]) -> Result<ReportEmail> {
        let window = summary.window();
        let (cards, highlights, charts) = match summary {
            ReportSummary::Daily(daily) => self.daily_sections(daily),
            ReportSummary::Weekly(weekly) => self.weekly_sections(weekly),
        };

        let title = summary.kind().title();
        let period = window.label();
        let html = render_email(title, &period, &cards, &highlights, &charts);

        let inline_images = charts
            .iter()
            .map(|chart| InlineImage {
                content_id: chart.content_id.to_string(),
                content_type: SVG_CONTENT_TYPE.to_string(),
                bytes: render_chart(&ChartSpec {
                    kind: chart.kind,
                    title: chart.title,
                    axis_label: &format!("Sales ({})", self.currency_symbol),
                    points: chart.points,
                })
                .into_bytes(),
            })
            .collect();

        let csv = export_csv(rows).context("failed to build CSV export")?;

        Ok(ReportEmail {
            subject: format!("{} - {}", title, period),
            html,
            inline_images,
            attachments: vec![EmailAttachment {
                filename: csv_filename(window),
                content_type: CSV_CONTENT_TYPE.to_string(),
                bytes: csv,
            }],
        })
    }
}

struct Card {
    label: &'static str,
    value: String,
}

impl Card {
    fn new(label: &'static str, value: String) -> Self {
        Self { label, value }
    }
}

struct Chart<'a> {
    content_id: &'static str,
    kind: ChartKind,
    title: &'static str,
    points: &'a [SeriesPoint],
}

fn growth_line(growth: Option<Decimal>, previous: &str, against: &str) -> String {
    let class = match growth {
        Some(value) if value.is_sign_negative() && !value.is_zero() => "down",
        Some(_) => "up",
        None => "flat",
    };
    format!(
        "Growth vs {}: <span class=\"{}\">{}</span> (previous total {})",
        against,
        class,
        format_percent(growth),
        previous
    )
}

fn product_line(product: &Ranked<i64>) -> String {
    format!(
        "Top product: <strong>{}</strong> with {} units",
        escape_markup(&product.label),
        format_count(product.value)
    )
}

pub fn csv_filename(window: &ReportWindow) -> String {
    format!("sales_detail_{}.csv", window.file_stem())
}

/// One line per sale, in query order, after a header line.
pub fn export_csv(rows: &[SaleRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for row in rows {
        writer.write_record([
            row.sold_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            row.price.to_string(),
            row.quantity.to_string(),
            row.payment_mode.clone(),
            row.branch.clone(),
            row.brand.clone(),
            row.model.clone(),
            row.size.clone(),
            row.sku.clone(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| anyhow::anyhow!("failed to flush CSV export: {}", err.error()))
}

fn render_email(
    title: &str,
    period: &str,
    cards: &[Card],
    highlights: &[String],
    charts: &[Chart<'_>],
) -> String {
    let cards_html = cards
        .iter()
        .map(|card| {
            format!(
                "<td class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div></td>",
                card.label,
                escape_markup(&card.value)
            )
        })
        .collect::<String>();
    let highlights_html = highlights
        .iter()
        .map(|line| format!("<li>{}</li>", line))
        .collect::<String>();
    let charts_html = charts
        .iter()
        .map(|chart| {
            format!(
                "<div class=\"chart\"><img src=\"cid:{cid}\" alt=\"{alt}\" width=\"800\" /></div>",
                cid = chart.content_id,
                alt = chart.title
            )
        })
        .collect::<String>();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<meta name="viewport" content="width=device-width, initial-scale=1" />
<title>{title} - {period}</title>
<style>
body {{
  margin: 0;
  font-family: Arial, Helvetica, sans-serif;
  background: #f1f5f9;
  color: #0f172a;
}}
.page {{ max-width: 860px; margin: 0 auto; padding: 24px 16px 40px; }}
.hero {{
  background: #2A5C8F;
  color: #ffffff;
  border-radius: 14px;
  padding: 22px 24px;
}}
.hero h1 {{ margin: 0 0 6px; font-size: 24px; }}
.hero p {{ margin: 0; font-size: 14px; opacity: 0.85; }}
.cards {{ width: 100%; border-spacing: 10px; margin: 12px -10px; }}
.card {{
  background: #ffffff;
  padding: 14px 16px;
  border-radius: 12px;
  vertical-align: top;
}}
.card .label {{
  font-size: 11px;
  text-transform: uppercase;
  letter-spacing: 0.1em;
  color: #64748b;
}}
.card .value {{ font-size: 20px; font-weight: 700; margin-top: 6px; }}
.highlights {{
  background: #ffffff;
  border-radius: 12px;
  padding: 14px 18px 14px 36px;
  line-height: 1.7;
}}
.up {{ color: #16a34a; font-weight: 700; }}
.down {{ color: #dc2626; font-weight: 700; }}
.flat {{ color: #64748b; font-weight: 700; }}
.chart {{ margin-top: 16px; background: #ffffff; border-radius: 12px; padding: 8px; text-align: center; }}
.chart img {{ max-width: 100%; height: auto; }}
.footer {{ margin-top: 20px; font-size: 12px; color: #64748b; }}
</style>
</head>
<body>
<div class="page">
  <div class="hero">
    <h1>{title}</h1>
    <p>Period: {period}</p>
  </div>
  <table class="cards"><tr>{cards}</tr></table>
  <ul class="highlights">{highlights}</ul>
  {charts}
  <p class="footer">The detailed sales for this period are attached as CSV.</p>
</div>
</body>
</html>"#,
        title = escape_markup(title),
        period = escape_markup(period),
        cards = cards_html,
        highlights = highlights_html,
        charts = charts_html,
    )
}
