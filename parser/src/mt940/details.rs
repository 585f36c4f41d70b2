use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::model::DetailFields;
use crate::utils::normalize_decimal;

/// Разделитель подполей в блоке :86:
pub const SEGMENT_SEPARATOR: char = '~';

/// Известные двухсимвольные ключи подполей :86:
///
/// Порядок объявления совпадает с порядком ключей.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SubTag {
    /// ~00 код операции текстом
    Code,
    /// ~20..~25 назначение платежа
    Title20,
    Title21,
    Title22,
    Title23,
    Title24,
    Title25,
    /// ~26..~28 референс платежа
    Reference26,
    Reference27,
    Reference28,
    /// ~29
    Nrb,
    /// ~30
    Nrozl,
    /// ~31
    Nrach,
    /// ~32, ~33 имя контрагента
    Name32,
    Name33,
    /// ~34 дубль кода операции
    SubCode,
    /// ~38 IBAN контрагента
    Iban,
    /// ~60 комиссия
    Fee,
    /// ~61 дубль курса
    ExchangeRate,
    /// ~62, ~63 продолжение имени контрагента
    Name62,
    Name63,
}

impl SubTag {
    pub fn from_key(key: &str) -> Option<Self> {
        let tag = match key {
            "00" => SubTag::Code,
            "20" => SubTag::Title20,
            "21" => SubTag::Title21,
            "22" => SubTag::Title22,
            "23" => SubTag::Title23,
            "24" => SubTag::Title24,
            "25" => SubTag::Title25,
            "26" => SubTag::Reference26,
            "27" => SubTag::Reference27,
            "28" => SubTag::Reference28,
            "29" => SubTag::Nrb,
            "30" => SubTag::Nrozl,
            "31" => SubTag::Nrach,
            "32" => SubTag::Name32,
            "33" => SubTag::Name33,
            "34" => SubTag::SubCode,
            "38" => SubTag::Iban,
            "60" => SubTag::Fee,
            "61" => SubTag::ExchangeRate,
            "62" => SubTag::Name62,
            "63" => SubTag::Name63,
            _ => return None,
        };
        Some(tag)
    }
}

/// Значения подполей блока, по одному на ключ.
///
/// Повторяющиеся ключи склеиваются в порядке появления.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubTags(BTreeMap<SubTag, String>);

impl SubTags {
    /// Разбирает блок вида "20Invoice~21#123~38PL00112233"
    pub fn parse(block: &str) -> Self {
        let mut tags = SubTags::default();

        for segment in block.split(SEGMENT_SEPARATOR) {
            let Some((key, value)) = split_key(segment) else {
                if segment.is_empty() {
                    debug!("empty '~' segment skipped");
                } else {
                    warn!(segment, "does not look like a '~' sub-tag, skipped");
                }
                continue;
            };

            match SubTag::from_key(key) {
                Some(tag) => tags.0.entry(tag).or_default().push_str(value),
                None => debug!(key, value, "unknown '~' sub-tag skipped"),
            }
        }

        tags
    }

    /// Значение ключа или пустая строка
    pub fn get(&self, tag: SubTag) -> &str {
        self.0.get(&tag).map_or("", String::as_str)
    }

    fn joined(&self, tags: &[SubTag]) -> String {
        tags.iter().map(|t| self.get(*t)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Собирает поля проводки из подполей
    pub fn to_detail_fields(&self) -> DetailFields {
        use SubTag::*;

        let title = format!(
            "{} {}",
            self.get(Title20),
            self.joined(&[Title21, Title22, Title23, Title24, Title25])
        );
        let sub_code = self.get(SubCode).trim();
        let exchange_rate = normalize_decimal(self.get(ExchangeRate));

        DetailFields {
            code: self.get(Code).to_string(),
            title: title.trim().to_string(),
            reference: quoted(&self.joined(&[Reference26, Reference27, Reference28])),
            nrb: quoted(self.get(Nrb)),
            nrozl: quoted(self.get(Nrozl)),
            nrach: quoted(self.get(Nrach)),
            name: self
                .joined(&[Name32, Name33, Name62, Name63])
                .trim()
                .to_string(),
            sub_code: (!sub_code.is_empty()).then(|| format!("'{sub_code}")),
            iban: self.get(Iban).trim().to_string(),
            bic: String::new(),
            fee: self.get(Fee).trim().to_string(),
            exchange_rate: (!exchange_rate.is_empty()).then_some(exchange_rate),
        }
    }
}

/// Первые два символа - ключ, остальное - значение
fn split_key(segment: &str) -> Option<(&str, &str)> {
    let mut chars = segment.char_indices();
    chars.next()?;
    chars.next()?;
    let split_at = chars.next().map_or(segment.len(), |(idx, _)| idx);
    Some(segment.split_at(split_at))
}

/// Кавычка в начале помечает поле как текст для табличных редакторов
fn quoted(s: &str) -> String {
    format!("'{}", s.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    // split_key

    #[test]
    fn split_key_takes_two_chars() {
        assert_eq!(split_key("20Invoice"), Some(("20", "Invoice")));
        assert_eq!(split_key("38"), Some(("38", "")));
        assert_eq!(split_key("2"), None);
        assert_eq!(split_key(""), None);
    }

    #[test]
    fn split_key_respects_char_boundaries() {
        assert_eq!(split_key("łóx"), Some(("łó", "x")));
    }

    // SubTags::parse

    #[test]
    fn parse_concatenates_repeated_keys_in_order() {
        let tags = SubTags::parse("32JAN~32 KOWALSKI~20A");
        assert_eq!(tags.get(SubTag::Name32), "JAN KOWALSKI");
        assert_eq!(tags.get(SubTag::Title20), "A");
    }

    #[test]
    fn parse_skips_short_and_unknown_segments() {
        let tags = SubTags::parse("~x~99whatever~38PL61109010140000071219812874");
        assert_eq!(tags.get(SubTag::Iban), "PL61109010140000071219812874");
        assert_eq!(tags.0.len(), 1);
    }

    #[test]
    fn parse_of_empty_block_is_empty() {
        assert!(SubTags::parse("").is_empty());
    }

    // to_detail_fields

    #[test]
    fn details_example_builds_title_and_iban() {
        let fields = SubTags::parse("20Invoice~21#123~38PL00112233").to_detail_fields();
        assert_eq!(fields.title, "Invoice #123");
        assert_eq!(fields.iban, "PL00112233");
    }

    #[test]
    fn title_joins_keys_21_to_25_without_spaces() {
        let fields = SubTags::parse("20Faktura~21FV/1~22/2024~25 koniec").to_detail_fields();
        assert_eq!(fields.title, "Faktura FV/1/2024 koniec");
    }

    #[test]
    fn quoted_fields_get_leading_quote_even_when_empty() {
        let fields = SubTags::parse("2612~2734~29 111 ").to_detail_fields();
        assert_eq!(fields.reference, "'1234");
        assert_eq!(fields.nrb, "'111");
        assert_eq!(fields.nrozl, "'");
        assert_eq!(fields.nrach, "'");
    }

    #[test]
    fn name_joins_all_name_parts() {
        let fields = SubTags::parse("32JAN ~33KOWALSKI~62 SP. ~63Z O.O. ").to_detail_fields();
        assert_eq!(fields.name, "JAN KOWALSKI SP. Z O.O.");
    }

    #[test]
    fn duplicates_for_cross_validation_are_optional() {
        let empty = SubTags::parse("20x").to_detail_fields();
        assert_eq!(empty.sub_code, None);
        assert_eq!(empty.exchange_rate, None);

        let full = SubTags::parse("34 152~61KURS 4,3012~604,50").to_detail_fields();
        assert_eq!(full.sub_code.as_deref(), Some("'152"));
        assert_eq!(full.exchange_rate.as_deref(), Some("4.3012"));
        assert_eq!(full.fee, "4,50");
        assert_eq!(full.bic, "");
    }
}
