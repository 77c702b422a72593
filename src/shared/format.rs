//! Display formatting for result tables and statistics.
//!
//! Amounts use the Vietnamese đồng style: no fractional digits, `.` as the
//! thousands separator and the `₫` sign after the number (`1.234.567 ₫`).

/// Format an amount as VND, rounded to whole đồng.
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value.round() } else { 0.0 };
    let negative = value < 0.0;
    let digits = format!("{}", value.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-{} ₫", grouped)
    } else {
        format!("{} ₫", grouped)
    }
}

/// Format a fraction (0.125) as a percentage with `decimals` digits ("12.5%").
pub fn format_percent(fraction: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, fraction * 100.0)
}

pub fn format_fixed(value: f64, decimals: usize) -> String {
    format!("{:.*}", decimals, value)
}

/// Signed currency change with its percentage of `base`, e.g. `+500.000 ₫ (+10.0%)`.
/// A zero base reports `0.0%`.
pub fn format_change(change: f64, base: f64) -> String {
    let percent = if base > 0.0 { change / base * 100.0 } else { 0.0 };
    if change >= 0.0 {
        format!("+{} (+{:.1}%)", format_currency(change), percent)
    } else {
        format!("{} ({:.1}%)", format_currency(change), percent)
    }
}
