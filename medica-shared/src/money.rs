//! Formatting helpers for amounts held in integer minor units.

/// Render a minor-unit amount as a decimal string, e.g. `125000` -> `"1250.00"`.
///
/// Negative amounts keep the sign in front of the whole value: `-50` -> `"-0.50"`.
pub fn format_minor(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// Render a minor-unit amount together with a currency code, e.g. `"1250.00 KZT"`.
pub fn format_minor_with_currency(amount: i64, currency: &str) -> String {
    format!("{} {}", format_minor(amount), currency)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_whole_and_fraction() {
        assert_eq!(format_minor(125000), "1250.00");
        assert_eq!(format_minor(105), "1.05");
        assert_eq!(format_minor(0), "0.00");
    }

    #[test]
    fn test_format_negative() {
        assert_eq!(format_minor(-50), "-0.50");
        assert_eq!(format_minor(-125000), "-1250.00");
    }

    #[test]
    fn test_format_with_currency() {
        assert_eq!(format_minor_with_currency(99900, "USD"), "999.00 USD");
    }
}
