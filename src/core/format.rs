//! Text formatting for summaries and math explanations.

const CURRENCY: &str = "₱";

/// `₱1,234.56`; negative amounts keep their sign in front of the symbol.
pub fn money(value: f64) -> String {
    if !value.is_finite() {
        return format!("{CURRENCY}{value}");
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}{CURRENCY}{}.{fraction:02}", group_thousands(whole))
}

/// Percent with one decimal from a fraction: 0.125 -> "12.5%".
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// `dining_out` -> `dining out`.
pub fn humanize(label: &str) -> String {
    label.replace('_', " ")
}

pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands_and_rounds_cents() {
        assert_eq!(money(0.0), "₱0.00");
        assert_eq!(money(999.999), "₱1,000.00");
        assert_eq!(money(1_234_567.891), "₱1,234,567.89");
        assert_eq!(money(-2_500.5), "-₱2,500.50");
        assert_eq!(money(-0.001), "₱0.00");
    }

    #[test]
    fn percent_and_rounding_helpers() {
        assert_eq!(percent(0.125), "12.5%");
        assert_eq!(round_to(0.123_456, 4), 0.1235);
        assert_eq!(humanize("shopping_leisure"), "shopping leisure");
    }
}
