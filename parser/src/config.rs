use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ParseError;
use crate::mt940::CodePage;

/// Настройки декодера выписок.
///
/// Все поля необязательны: отсутствующие в JSON берутся из [`DecoderConfig::default`].
///
/// ```json
/// { "bank_label": "ING", "code_page": "cp852", "century": "20" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// префикс метки счёта, к нему дописывается валюта выписки: "ING PLN"
    pub bank_label: String,
    /// кодовая страница файла: "cp852" или любая метка WHATWG ("windows-1250", "utf-8", ...)
    pub code_page: String,
    /// первые две цифры года для дат YYMMDD
    pub century: String,
    /// год (YY) для дат MMDD, у которых нет соседней полной даты
    pub fallback_year: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            bank_label: "ING".to_string(),
            code_page: "cp852".to_string(),
            century: "20".to_string(),
            fallback_year: "24".to_string(),
        }
    }
}

impl DecoderConfig {
    /// Читает конфиг из JSON-файла и проверяет его
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let content = fs::read_to_string(path.as_ref())?;
        let config: DecoderConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверяет, что значения пригодны для декодера
    pub fn validate(&self) -> Result<(), ParseError> {
        if !is_two_digits(&self.century) {
            return Err(ParseError::Config(format!(
                "century must be two digits, got '{}'",
                self.century
            )));
        }
        if !is_two_digits(&self.fallback_year) {
            return Err(ParseError::Config(format!(
                "fallback_year must be two digits, got '{}'",
                self.fallback_year
            )));
        }
        CodePage::from_label(&self.code_page)?;
        Ok(())
    }

    /// Метка счёта для транзакций выписки в валюте `currency`
    pub fn account_label(&self, currency: &str) -> String {
        format!("{} {}", self.bank_label, currency)
    }
}

fn is_two_digits(s: &str) -> bool {
    s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit())
}
