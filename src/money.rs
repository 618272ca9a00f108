//! Brazilian-locale monetary amounts: `1.234,56` (period groups thousands,
//! comma separates cents).

/// Rounds to two decimal places, half away from zero.
pub fn round_cents(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Whole number of cents for a non-negative amount.
pub fn to_cents(v: f64) -> u64 {
    (v.max(0.0) * 100.0).round() as u64
}

/// Parses an amount written either in locale form (`1.234,56`) or plain form
/// (`1234.56`, `1234`). A leading `R$` and trailing separators are ignored.
/// Returns `None` for anything else, including the not-found sentinel.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let mut s = raw.trim();
    if let Some(rest) = s.strip_prefix("R$").or_else(|| s.strip_prefix("r$")) {
        s = rest.trim_start();
    }
    let s = s.trim_end_matches([',', '.']);

    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if digits.is_empty() || !digits.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    if !digits.chars().all(|c| c.is_ascii_digit() || c == '.' || c == ',') {
        return None;
    }

    let normalized = match digits.matches(',').count() {
        0 => {
            let dots = digits.matches('.').count();
            let decimals = digits.rsplit('.').next().map_or(0, str::len);
            if dots == 1 && (1..=2).contains(&decimals) {
                digits.to_string()
            } else {
                digits.replace('.', "")
            }
        }
        1 => digits.replace('.', "").replace(',', "."),
        _ => return None,
    };

    let v: f64 = normalized.parse().ok()?;
    Some(if negative { -v } else { v })
}

/// Renders an amount as `1.234,56`.
pub fn format_amount(v: f64) -> String {
    let negative = v < 0.0;
    let cents = (v.abs() * 100.0).round() as u64;
    let int_part = (cents / 100).to_string();

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative && cents > 0 { "-" } else { "" };
    format!("{sign}{grouped},{:02}", cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(format_amount(0.0), "0,00");
        assert_eq!(format_amount(999.5), "999,50");
        assert_eq!(format_amount(1000.0), "1.000,00");
        assert_eq!(format_amount(1234567.891), "1.234.567,89");
    }

    #[test]
    fn dot_only_inputs() {
        assert_eq!(parse_amount("1234.56"), Some(1234.56));
        assert_eq!(parse_amount("1.234"), Some(1234.0));
        assert_eq!(parse_amount("1.234.567"), Some(1234567.0));
    }
}
