use std::io::Error as IoError;
use thiserror::Error;

/// Ошибки при декодировании выписок и работе с их результатом
#[derive(Debug, Error)]
pub enum ParseError {
    // обёртки

    /// обёртка std::io::Error
    #[error("io error: {0}")]
    Io(#[from] IoError),
    /// обёртка csv::Error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    /// обёртка serde_json::Error (конфиг и JSON-экспорт)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // логические ошибки

    /// файл не является выпиской MT940 (значение тега :20:)
    #[error("not an MT940 statement: {0}")]
    WrongFormat(String),
    /// очень общая ошибка плохих входных данных
    #[error("bad input: {0}")]
    BadInput(String),
    /// ошибка при разборе денежной суммы
    #[error("invalid amount: {0}")]
    InvalidAmount(String),
    /// кодовая страница из конфига не поддерживается
    #[error("unknown code page: {0}")]
    UnknownCodePage(String),
    /// некорректное значение в конфиге
    #[error("bad config: {0}")]
    Config(String),
}
