// SVG charts embedded inline in report emails

use rust_decimal::prelude::ToPrimitive;

use backend_domain::SeriesPoint;

use super::format::escape_markup;

pub const PALETTE: [&str; 4] = ["#2A5C8F", "#30A5BF", "#F2B705", "#F25C05"];

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const TOP: f64 = 64.0;
const RIGHT: f64 = 32.0;
const BOTTOM: f64 = 96.0;
const LEFT: f64 = 88.0;
const HORIZONTAL_LEFT: f64 = 180.0;
const TICKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bars,
    HorizontalBars,
    Line,
}

#[derive(Debug, Clone)]
pub struct ChartSpec<'a> {
    pub kind: ChartKind,
    pub title: &'a str,
    pub axis_label: &'a str,
    pub points: &'a [SeriesPoint],
}

pub fn render_chart(spec: &ChartSpec<'_>) -> String {
    let body = if spec.points.is_empty() {
        format!(
            r##"<text x="{x}" y="{y}" text-anchor="middle" class="empty">No data</text>"##,
            x = WIDTH / 2.0,
            y = HEIGHT / 2.0
        )
    } else {
        match spec.kind {
            ChartKind::Bars => vertical_bars(spec),
            ChartKind::HorizontalBars => horizontal_bars(spec),
            ChartKind::Line => line(spec),
        }
    };

    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
<style>
text {{ font-family: Arial, Helvetica, sans-serif; fill: #333333; }}
.title {{ font-size: 20px; font-weight: bold; }}
.axis {{ font-size: 12px; fill: #555555; }}
.tick {{ font-size: 11px; fill: #666666; }}
.grid {{ stroke: #e5e7eb; stroke-width: 1; }}
.empty {{ font-size: 16px; fill: #888888; }}
</style>
<rect width="{width}" height="{height}" fill="#ffffff"/>
<text x="{title_x}" y="36" text-anchor="middle" class="title">{title}</text>
{body}
</svg>"##,
        width = WIDTH,
        height = HEIGHT,
        title_x = WIDTH / 2.0,
        title = escape_markup(spec.title),
        body = body,
    )
}

fn values(points: &[SeriesPoint]) -> Vec<f64> {
    points
        .iter()
        .map(|point| point.value.to_f64().unwrap_or(0.0).max(0.0))
        .collect()
}

/// Rounds the largest value up to a readable axis maximum.
fn axis_max(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if max <= 0.0 {
        return 1.0;
    }
    let magnitude = 10_f64.powf(max.log10().floor());
    [1.0, 2.0, 2.5, 5.0, 10.0]
        .into_iter()
        .map(|factor| factor * magnitude)
        .find(|candidate| *candidate >= max)
        .unwrap_or(10.0 * magnitude)
}

fn tick_label(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if value >= 10_000.0 {
        format!("{:.0}k", value / 1_000.0)
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{:.1}", value)
    }
}

fn vertical_bars(spec: &ChartSpec<'_>) -> String {
    let values = values(spec.points);
    let max = axis_max(&values);
    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;
    let baseline = TOP + plot_h;
    let slot = plot_w / values.len() as f64;
    let bar_w = slot * 0.7;

    let mut out = value_grid(max, plot_w, plot_h, LEFT);
    for (idx, (point, value)) in spec.points.iter().zip(&values).enumerate() {
        let height = value / max * plot_h;
        let x = LEFT + idx as f64 * slot + (slot - bar_w) / 2.0;
        let center = x + bar_w / 2.0;
        out.push_str(&format!(
            r##"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{label}: {value:.2}</title></rect>
<text x="{cx:.1}" y="{ly:.1}" text-anchor="end" class="tick" transform="rotate(-40 {cx:.1} {ly:.1})">{label}</text>
"##,
            x = x,
            y = baseline - height,
            w = bar_w,
            h = height,
            fill = PALETTE[idx % PALETTE.len()],
            label = escape_markup(&point.label),
            value = value,
            cx = center,
            ly = baseline + 16.0,
        ));
    }
    out.push_str(&axis_title(spec.axis_label, true));
    out
}

fn horizontal_bars(spec: &ChartSpec<'_>) -> String {
    let values = values(spec.points);
    let max = axis_max(&values);
    let plot_w = WIDTH - HORIZONTAL_LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM / 2.0;
    let slot = plot_h / values.len() as f64;
    let bar_h = slot * 0.7;

    let mut out = String::new();
    for tick in 0..=TICKS {
        let value = max * tick as f64 / TICKS as f64;
        let x = HORIZONTAL_LEFT + plot_w * tick as f64 / TICKS as f64;
        out.push_str(&format!(
            r##"<line class="grid" x1="{x:.1}" y1="{top:.1}" x2="{x:.1}" y2="{bottom:.1}"/>
<text x="{x:.1}" y="{ty:.1}" text-anchor="middle" class="tick">{label}</text>
"##,
            x = x,
            top = TOP,
            bottom = TOP + plot_h,
            ty = TOP + plot_h + 16.0,
            label = tick_label(value),
        ));
    }
    for (idx, (point, value)) in spec.points.iter().zip(&values).enumerate() {
        let width = value / max * plot_w;
        let y = TOP + idx as f64 * slot + (slot - bar_h) / 2.0;
        out.push_str(&format!(
            r##"<rect class="bar" x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" fill="{fill}"><title>{label}: {value:.2}</title></rect>
<text x="{lx:.1}" y="{ly:.1}" text-anchor="end" class="axis">{label}</text>
"##,
            x = HORIZONTAL_LEFT,
            y = y,
            w = width,
            h = bar_h,
            fill = PALETTE[idx % PALETTE.len()],
            label = escape_markup(&point.label),
            value = value,
            lx = HORIZONTAL_LEFT - 8.0,
            ly = y + bar_h / 2.0 + 4.0,
        ));
    }
    out.push_str(&axis_title(spec.axis_label, false));
    out
}

fn line(spec: &ChartSpec<'_>) -> String {
    let values = values(spec.points);
    let max = axis_max(&values);
    let plot_w = WIDTH - LEFT - RIGHT;
    let plot_h = HEIGHT - TOP - BOTTOM;
    let baseline = TOP + plot_h;
    let step = if values.len() > 1 {
        plot_w / (values.len() - 1) as f64
    } else {
        0.0
    };
    let x_at = |idx: usize| {
        if values.len() > 1 {
            LEFT + idx as f64 * step
        } else {
            LEFT + plot_w / 2.0
        }
    };

    let mut out = value_grid(max, plot_w, plot_h, LEFT);
    let path = values
        .iter()
        .enumerate()
        .map(|(idx, value)| format!("{:.1},{:.1}", x_at(idx), baseline - value / max * plot_h))
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&format!(
        r##"<polyline points="{path}" fill="none" stroke="{stroke}" stroke-width="2.5"/>
"##,
        path = path,
        stroke = PALETTE[0],
    ));
    for (idx, (point, value)) in spec.points.iter().zip(&values).enumerate() {
        let x = x_at(idx);
        let y = baseline - value / max * plot_h;
        out.push_str(&format!(
            r##"<circle class="marker" cx="{x:.1}" cy="{y:.1}" r="4" fill="{fill}"><title>{label}: {value:.2}</title></circle>
<text x="{x:.1}" y="{ly:.1}" text-anchor="end" class="tick" transform="rotate(-40 {x:.1} {ly:.1})">{label}</text>
"##,
            x = x,
            y = y,
            fill = PALETTE[0],
            label = escape_markup(&point.label),
            value = value,
            ly = baseline + 16.0,
        ));
    }
    out.push_str(&axis_title(spec.axis_label, true));
    out
}

fn value_grid(max: f64, plot_w: f64, plot_h: f64, left: f64) -> String {
    let mut out = String::new();
    for tick in 0..=TICKS {
        let value = max * tick as f64 / TICKS as f64;
        let y = TOP + plot_h - plot_h * tick as f64 / TICKS as f64;
        out.push_str(&format!(
            r##"<line class="grid" x1="{x1:.1}" y1="{y:.1}" x2="{x2:.1}" y2="{y:.1}"/>
<text x="{tx:.1}" y="{ty:.1}" text-anchor="end" class="tick">{label}</text>
"##,
            x1 = left,
            x2 = left + plot_w,
            y = y,
            tx = left - 8.0,
            ty = y + 4.0,
            label = tick_label(value),
        ));
    }
    out
}

fn axis_title(label: &str, vertical: bool) -> String {
    if vertical {
        let y = TOP + (HEIGHT - TOP - BOTTOM) / 2.0;
        format!(
            r##"<text x="20" y="{y:.1}" text-anchor="middle" class="axis" transform="rotate(-90 20 {y:.1})">{label}</text>
"##,
            y = y,
            label = escape_markup(label),
        )
    } else {
        format!(
            r##"<text x="{x:.1}" y="{y:.1}" text-anchor="middle" class="axis">{label}</text>
"##,
            x = HORIZONTAL_LEFT + (WIDTH - HORIZONTAL_LEFT - RIGHT) / 2.0,
            y = HEIGHT - 12.0,
            label = escape_markup(label),
        )
    }
}
