use rust_decimal::Decimal;
use std::str::FromStr;

/// Rewrite locale-formatted amount text as a plain `1234.56` decimal string.
///
/// Spaces, currency markers and a leading sign are removed. When both `.` and `,`
/// occur, the last one is the decimal separator. A lone separator that occurs once is
/// decimal; one that repeats is a thousands separator.
pub fn normalize_amount_text(s: &str) -> String {
    let s: String = s
        .replace("EUR", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '€')
        .collect();
    let s = s.trim_start_matches(['+', '-']);

    let dots = s.matches('.').count();
    let commas = s.matches(',').count();

    match (dots, commas) {
        (0, 0) => s.to_string(),
        (_, 0) if dots > 1 => s.replace('.', ""),
        (0, _) if commas > 1 => s.replace(',', ""),
        (_, 0) => s.to_string(),
        (0, _) => s.replace(',', "."),
        _ => {
            let last_dot = s.rfind('.').unwrap_or(0);
            let last_comma = s.rfind(',').unwrap_or(0);
            if last_comma > last_dot {
                s.replace('.', "").replace(',', ".")
            } else {
                s.replace(',', "")
            }
        }
    }
}

/// Parse amount text into a signed decimal. A leading `-` negates.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let trimmed = s.trim();
    let negative = trimmed.starts_with('-');
    let normalized = normalize_amount_text(trimmed);
    if normalized.is_empty() || !normalized.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return None;
    }
    let value = Decimal::from_str(&normalized).ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn european_with_space_thousands() {
        assert_eq!(normalize_amount_text("1 234,56"), "1234.56");
    }

    #[test]
    fn plain_dot_decimal_untouched() {
        assert_eq!(normalize_amount_text("45.67"), "45.67");
    }

    #[test]
    fn european_dot_thousands() {
        assert_eq!(normalize_amount_text("2.000,00"), "2000.00");
    }

    #[test]
    fn comma_decimal() {
        assert_eq!(normalize_amount_text("45,67"), "45.67");
    }

    #[test]
    fn us_comma_thousands() {
        assert_eq!(normalize_amount_text("1,234.56"), "1234.56");
    }

    #[test]
    fn repeated_separator_is_thousands() {
        assert_eq!(normalize_amount_text("1.234.567"), "1234567");
        assert_eq!(normalize_amount_text("1,234,567"), "1234567");
    }

    #[test]
    fn currency_and_sign_removed() {
        assert_eq!(normalize_amount_text("€ 12,50"), "12.50");
        assert_eq!(normalize_amount_text("-12,50 EUR"), "12.50");
    }

    #[test]
    fn parse_amount_signed() {
        assert_eq!(parse_amount("-12.50"), Some(dec("-12.50")));
        assert_eq!(parse_amount("+2000.00"), Some(dec("2000.00")));
        assert_eq!(parse_amount("- 12,34"), Some(dec("-12.34")));
    }

    #[test]
    fn parse_amount_rejects_text() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("n/a"), None);
        assert_eq!(parse_amount("12a"), None);
    }
}
