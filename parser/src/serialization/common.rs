/// Копейки -> строка с десятичной точкой и знаком: -123456 -> "-1234.56"
pub(crate) fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::format_cents;

    #[test]
    fn formats_zero_and_small_values() {
        assert_eq!(format_cents(0), "0.00");
        assert_eq!(format_cents(7), "0.07");
        assert_eq!(format_cents(-7), "-0.07");
    }

    #[test]
    fn formats_whole_units_and_fraction() {
        assert_eq!(format_cents(123456), "1234.56");
        assert_eq!(format_cents(-123456), "-1234.56");
    }

    #[test]
    fn handles_extremes() {
        assert_eq!(format_cents(i64::MIN), "-92233720368547758.08");
    }
}
