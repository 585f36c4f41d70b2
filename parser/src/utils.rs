use crate::error::ParseError;

/// Приводит число из MT940 к виду с десятичной точкой.
///
/// Убирает необязательный префикс "KURS" (так банк подписывает курс),
/// пробелы по краям и меняет запятую на точку: "KURS 4,3012" -> "4.3012"
pub(crate) fn normalize_decimal(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix("KURS").map(str::trim).unwrap_or(s);
    s.replace(',', ".")
}

/// Переводит сумму со знаком ("-1234.56", "1 234,56") в копейки.
///
/// Ожидает ровно два знака после разделителя, как во всех суммах выписки.
pub fn parse_cents(raw: &str) -> Result<i64, ParseError> {
    let cleaned = raw.trim().replace(' ', "");

    if cleaned.is_empty() {
        return Err(ParseError::InvalidAmount("empty amount".into()));
    }

    let (negative, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, cleaned.as_str()),
    };

    let separators = digits.matches([',', '.']).count();
    if separators > 1 {
        return Err(ParseError::InvalidAmount(format!(
            "too many decimal separators in amount: {cleaned}"
        )));
    }

    let Some(pos) = digits.find([',', '.']) else {
        return Err(ParseError::InvalidAmount(format!(
            "expected 2 decimal places, got none in: {cleaned}"
        )));
    };

    let (int_part, frac_part) = (&digits[..pos], &digits[pos + 1..]);
    if frac_part.len() != 2 {
        return Err(ParseError::InvalidAmount(format!(
            "expected 2 decimal places, got {} in: {cleaned}",
            frac_part.len()
        )));
    }
    let all_digits = int_part
        .bytes()
        .chain(frac_part.bytes())
        .all(|b| b.is_ascii_digit());
    if int_part.is_empty() || !all_digits {
        return Err(ParseError::InvalidAmount(format!("not a number: {cleaned}")));
    }

    let units: i64 = int_part
        .parse()
        .map_err(|_| ParseError::InvalidAmount(format!("amount out of range: {cleaned}")))?;
    let frac: i64 = frac_part
        .parse()
        .map_err(|_| ParseError::InvalidAmount(format!("invalid fractional part: {cleaned}")))?;

    let cents = units
        .checked_mul(100)
        .and_then(|v| v.checked_add(frac))
        .ok_or_else(|| ParseError::InvalidAmount(format!("amount out of range: {cleaned}")))?;

    Ok(if negative { -cents } else { cents })
}
