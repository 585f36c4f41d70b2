mod details;
mod entry;
mod lines;
mod utils;

use std::fs::File;
use std::io::{BufReader, Read};
use std::mem;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::DecoderConfig;
use crate::error::ParseError;
use crate::model::{BalanceLine, Statement};
use crate::utils::normalize_decimal;
use entry::RawEntry;
use utils::DateNormalizer;

pub use details::{SEGMENT_SEPARATOR, SubTag, SubTags};
pub use lines::{CodePage, LineScanner};

/// :20: значение должно быть равно [`INIT_PAYLOAD`]
pub const TAG_INIT: &str = ":20:";
pub const INIT_PAYLOAD: &str = "MT940";
/// :25:/ номер счёта (IBAN)
pub const TAG_ACCOUNT: &str = ":25:/";
/// :28C: номер выписки
pub const TAG_STATEMENT_NO: &str = ":28C:";
pub const TAG_OPENING_BALANCE: &str = ":60F:";
pub const TAG_CLOSING_BALANCE: &str = ":62F:";
pub const TAG_AVAILABLE_BALANCE: &str = ":64:";
/// :61: начало новой проводки
pub const TAG_TRANSACTION: &str = ":61:";
/// строка с курсом валютной проводки, без двоеточий
pub const TAG_EXCHANGE_RATE: &str = "KURS";
/// :86: описание проводки
pub const TAG_DETAILS: &str = ":86:";

/// Роль строки файла, определяется по префиксу.
///
/// Префиксы проверяются в порядке объявления вариантов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagLine<'a> {
    Init(&'a str),
    Account(&'a str),
    StatementNumber(&'a str),
    OpeningBalance(&'a str),
    ClosingBalance(&'a str),
    AvailableBalance(&'a str),
    Transaction(&'a str),
    ExchangeRate(&'a str),
    Details(&'a str),
    /// строка без тега: продолжение описания
    Continuation(&'a str),
}

impl<'a> TagLine<'a> {
    pub fn classify(line: &'a str) -> Self {
        let tags: [(&str, fn(&'a str) -> TagLine<'a>); 9] = [
            (TAG_INIT, TagLine::Init),
            (TAG_ACCOUNT, TagLine::Account),
            (TAG_STATEMENT_NO, TagLine::StatementNumber),
            (TAG_OPENING_BALANCE, TagLine::OpeningBalance),
            (TAG_CLOSING_BALANCE, TagLine::ClosingBalance),
            (TAG_AVAILABLE_BALANCE, TagLine::AvailableBalance),
            (TAG_TRANSACTION, TagLine::Transaction),
            (TAG_EXCHANGE_RATE, TagLine::ExchangeRate),
            (TAG_DETAILS, TagLine::Details),
        ];

        tags.iter()
            .find_map(|(prefix, make)| line.strip_prefix(prefix).map(make))
            .unwrap_or(TagLine::Continuation(line))
    }
}

/// Разбирает значение тега баланса: `[C|D]YYMMDDCCYсумма`
pub(crate) fn parse_balance(value: &str) -> Result<BalanceLine, ParseError> {
    let value = value.trim();

    // минимум: 1 (C/D) + 6 (дата) + 3 (валюта)
    if value.len() < 10 {
        return Err(ParseError::BadInput(format!(
            "balance value too short: '{value}'"
        )));
    }

    let (Some(date), Some(currency), Some(amount)) =
        (value.get(1..7), value.get(7..10), value.get(10..))
    else {
        return Err(ParseError::BadInput(format!(
            "balance value has unexpected characters: '{value}'"
        )));
    };

    let sign = if value.starts_with('D') { "-" } else { "" };

    Ok(BalanceLine {
        amount: format!("{sign}{}", normalize_decimal(amount)),
        currency: currency.to_string(),
        date: date.to_string(),
    })
}

/// Состояние разбора
#[derive(Debug)]
enum State {
    /// проводка ещё не началась
    Idle,
    /// после :61:, строк :86: ещё не было
    AccumulatingTransaction(RawEntry),
    /// после первой :86:, всё дальнейшее - блок подполей
    InDetailsContinuation(RawEntry),
}

/// Однопроходный разбор строк в [`Statement`]
struct Dispatcher<'d> {
    config: &'d DecoderConfig,
    dates: &'d DateNormalizer,
    statement: Statement,
    state: State,
}

impl<'d> Dispatcher<'d> {
    fn new(config: &'d DecoderConfig, dates: &'d DateNormalizer) -> Self {
        Self {
            config,
            dates,
            statement: Statement::default(),
            state: State::Idle,
        }
    }

    fn step(&mut self, line: &str) -> Result<(), ParseError> {
        if line.is_empty() {
            return Ok(());
        }

        match TagLine::classify(line) {
            TagLine::Init(value) => {
                if value != INIT_PAYLOAD {
                    return Err(ParseError::WrongFormat(line.to_string()));
                }
            }
            TagLine::Account(value) => self.statement.account_id = value.to_string(),
            TagLine::StatementNumber(value) => self.statement.statement_number = value.to_string(),
            TagLine::OpeningBalance(value) => {
                if let Some(b) = balance_or_warn(TAG_OPENING_BALANCE, value) {
                    self.statement.opening_balance = b;
                }
            }
            TagLine::ClosingBalance(value) => {
                if let Some(b) = balance_or_warn(TAG_CLOSING_BALANCE, value) {
                    self.statement.closing_balance = b;
                }
            }
            TagLine::AvailableBalance(value) => {
                if let Some(b) = balance_or_warn(TAG_AVAILABLE_BALANCE, value) {
                    self.statement.available_balance = Some(b);
                }
            }
            TagLine::Transaction(value) => {
                self.flush();
                // пустая :61: проводку не открывает, её :86: отбрасываются
                if value.is_empty() {
                    warn!(line, "transaction line without payload skipped");
                    return Ok(());
                }
                let currency = self.statement.currency().to_string();
                let label = self.config.account_label(&currency);
                self.state = State::AccumulatingTransaction(RawEntry::new(value, &currency, label));
            }
            TagLine::ExchangeRate(value) => match &mut self.state {
                State::AccumulatingTransaction(entry) | State::InDetailsContinuation(entry) => {
                    entry.exchange_rate = Some(normalize_decimal(value));
                }
                State::Idle => debug!(line, "exchange rate outside of a transaction skipped"),
            },
            TagLine::Details(value) => {
                self.state = match mem::replace(&mut self.state, State::Idle) {
                    State::AccumulatingTransaction(mut entry) => {
                        entry.summary = value.to_string();
                        State::InDetailsContinuation(entry)
                    }
                    State::InDetailsContinuation(mut entry) => {
                        entry.details.push_str(value);
                        State::InDetailsContinuation(entry)
                    }
                    State::Idle => {
                        debug!(line, "details outside of a transaction skipped");
                        State::Idle
                    }
                };
            }
            TagLine::Continuation(value) => match &mut self.state {
                State::AccumulatingTransaction(entry) | State::InDetailsContinuation(entry) => {
                    entry.details.push_str(value);
                }
                State::Idle => debug!(line, "untagged line outside of a transaction skipped"),
            },
        }

        Ok(())
    }

    /// Закрывает текущую проводку, если она есть
    fn flush(&mut self) {
        if let State::AccumulatingTransaction(entry) | State::InDetailsContinuation(entry) =
            mem::replace(&mut self.state, State::Idle)
        {
            self.statement.transactions.push(entry.finalize(self.dates));
        }
    }

    fn finish(mut self) -> Statement {
        self.flush();
        self.statement
    }
}

fn balance_or_warn(tag: &str, value: &str) -> Option<BalanceLine> {
    match parse_balance(value) {
        Ok(b) => Some(b),
        Err(e) => {
            warn!(tag, error = %e, "malformed balance record skipped");
            None
        }
    }
}

/// Декодер выписок MT940.
///
/// Пример:
/// ```rust,no_run
/// use mt940_parser::{DecoderConfig, Mt940Decoder};
/// # fn main() -> Result<(), mt940_parser::ParseError> {
/// let decoder = Mt940Decoder::new(DecoderConfig::default())?;
/// let statement = decoder.decode_file("statement.sta")?;
/// for tx in &statement.transactions {
///     println!("{tx}");
/// }
/// #     Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Mt940Decoder {
    config: DecoderConfig,
    code_page: CodePage,
    dates: DateNormalizer,
}

impl Default for Mt940Decoder {
    fn default() -> Self {
        let config = DecoderConfig::default();
        let dates = DateNormalizer::new(&config.century, &config.fallback_year);
        Self {
            config,
            code_page: CodePage::Cp852,
            dates,
        }
    }
}

impl Mt940Decoder {
    /// Проверяет конфиг и создаёт декодер
    pub fn new(config: DecoderConfig) -> Result<Self, ParseError> {
        config.validate()?;
        let code_page = CodePage::from_label(&config.code_page)?;
        let dates = DateNormalizer::new(&config.century, &config.fallback_year);
        Ok(Self {
            config,
            code_page,
            dates,
        })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Строки файла, уже декодированные и обрезанные
    pub fn lines<R: Read>(&self, reader: R) -> LineScanner<BufReader<R>> {
        LineScanner::new(BufReader::new(reader), self.code_page)
    }

    /// Декодирует одну выписку.
    ///
    /// Ошибка возвращается только если файл не MT940 (тег :20:) или поток не читается.
    /// Всё остальное логируется, а проводка попадает в выписку с тем, что удалось разобрать.
    pub fn decode<R: Read>(&self, reader: R) -> Result<Statement, ParseError> {
        let mut dispatcher = Dispatcher::new(&self.config, &self.dates);
        for line in self.lines(reader) {
            dispatcher.step(&line?)?;
        }

        let statement = dispatcher.finish();
        debug!(
            account = %statement.account_id,
            statement_number = %statement.statement_number,
            transactions = statement.transactions.len(),
            "statement decoded"
        );
        Ok(statement)
    }

    /// Открывает файл на время одного прохода и декодирует его
    pub fn decode_file(&self, path: impl AsRef<Path>) -> Result<Statement, ParseError> {
        let file = File::open(path.as_ref())?;
        self.decode(file)
    }
}

impl Statement {
    /// Декодирует выписку с настройками по умолчанию
    pub fn from_mt940<R: Read>(reader: R) -> Result<Self, ParseError> {
        Mt940Decoder::default().decode(reader)
    }
}
