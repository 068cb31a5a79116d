use rust_decimal::{Decimal, RoundingStrategy};

/// `1234567.891` -> `1,234,567.89`
pub fn format_amount(value: Decimal) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let mut magnitude = rounded.abs();
    magnitude.rescale(2);
    let text = magnitude.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{}{}.{}", sign, group_thousands(whole), fraction)
}

pub fn format_money(symbol: &str, value: Decimal) -> String {
    format!("{} {}", symbol, format_amount(value))
}

pub fn format_count(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{}{}", sign, group_thousands(&value.unsigned_abs().to_string()))
}

pub fn format_percent(value: Option<Decimal>) -> String {
    match value {
        Some(value) if value.is_sign_positive() && !value.is_zero() => {
            format!("+{}%", format_amount(value))
        }
        Some(value) => format!("{}%", format_amount(value)),
        None => "n/a".to_string(),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Escapes text for HTML bodies and SVG documents alike.
pub fn escape_markup(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
