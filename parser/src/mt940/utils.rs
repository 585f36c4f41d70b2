use chrono::NaiveDate;

/// Приводит даты MT940 (YYMMDD, MMDD) к виду YYYY-MM-DD.
///
/// Работает со строками: дата, которую нельзя разобрать, возвращается как есть,
/// чтобы не терять данные выписки.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DateNormalizer {
    /// "20" для дат YYMMDD
    century: String,
    /// "24" для MMDD без соседней даты
    fallback_year: String,
}

impl DateNormalizer {
    pub(crate) fn new(century: &str, fallback_year: &str) -> Self {
        Self {
            century: century.to_string(),
            fallback_year: fallback_year.to_string(),
        }
    }

    /// YYMMDD -> YYYY-MM-DD; MMDD дополняется годом из конфига
    pub(crate) fn normalize(&self, raw: &str) -> String {
        self.complete(raw, &self.fallback_year)
    }

    /// MMDD дополняется годом из уже нормализованной соседней даты (YYYY-...)
    pub(crate) fn normalize_with_sibling(&self, raw: &str, sibling: &str) -> String {
        let year = sibling
            .get(0..4)
            .filter(|y| y.bytes().all(|b| b.is_ascii_digit()))
            .unwrap_or(&self.fallback_year);
        self.complete(raw, year)
    }

    fn complete(&self, raw: &str, year_prefix: &str) -> String {
        let mut d = raw.trim().to_string();
        if d.len() == 4 {
            d = format!("{year_prefix}{d}");
        }
        if d.len() == 6 {
            d = format!("{}{d}", self.century);
        }
        if d.len() == 8
            && let (Some(y), Some(m), Some(day)) = (d.get(0..4), d.get(4..6), d.get(6..8))
        {
            return format!("{y}-{m}-{day}");
        }
        d
    }
}

/// Проверяет, что YYYY-MM-DD - существующая календарная дата
pub(crate) fn is_calendar_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::new("20", "24")
    }

    #[test]
    fn normalize_expands_yymmdd() {
        assert_eq!(normalizer().normalize("240601"), "2024-06-01");
        assert_eq!(normalizer().normalize(" 251231 "), "2025-12-31");
    }

    #[test]
    fn normalize_uses_fallback_year_for_mmdd() {
        assert_eq!(normalizer().normalize("0601"), "2024-06-01");
        assert_eq!(DateNormalizer::new("20", "19").normalize("0102"), "2019-01-02");
    }

    #[test]
    fn normalize_with_sibling_takes_year_from_value_date() {
        assert_eq!(
            normalizer().normalize_with_sibling("0601", "2024-06-01"),
            "2024-06-01"
        );
        assert_eq!(
            normalizer().normalize_with_sibling("1231", "2023-12-30"),
            "2023-12-31"
        );
    }

    #[test]
    fn normalize_with_sibling_does_not_roll_year_back() {
        // проводка 31.12 с валютированием 02.01 получает год валютирования
        assert_eq!(
            normalizer().normalize_with_sibling("1231", "2024-01-02"),
            "2024-12-31"
        );
    }

    #[test]
    fn normalize_with_sibling_falls_back_when_sibling_is_unusable() {
        assert_eq!(normalizer().normalize_with_sibling("0601", ""), "2024-06-01");
        assert_eq!(normalizer().normalize_with_sibling("0601", "ab"), "2024-06-01");
    }

    #[test]
    fn normalize_passes_unexpected_lengths_through() {
        assert_eq!(normalizer().normalize("12345"), "12345");
        assert_eq!(normalizer().normalize(""), "");
        assert_eq!(normalizer().normalize("2024-06-01"), "2024-06-01");
    }

    #[test]
    fn is_calendar_date_rejects_impossible_dates() {
        assert!(is_calendar_date("2024-02-29"));
        assert!(!is_calendar_date("2023-02-29"));
        assert!(!is_calendar_date("2024-13-01"));
    }
}
