use serde::Serialize;
use std::fmt;

use crate::digest::Digest;
use crate::error::ParseError;
use crate::serialization::format_cents;
use crate::utils::parse_cents;

/// Баланс из тегов :60F: / :62F: / :64:
///
/// Сумма остаётся строкой: точная арифметика - забота вызывающего кода.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BalanceLine {
    /// сумма со знаком и десятичной точкой, напр. "-1234.56"
    pub amount: String,
    /// код валюты, как в файле: "PLN", "EUR", ...
    pub currency: String,
    /// дата в формате YYMMDD, ровно как в файле
    pub date: String,
}

impl BalanceLine {
    /// Сумма в копейках
    pub fn cents(&self) -> Result<i64, ParseError> {
        parse_cents(&self.amount)
    }
}

/// Центральная структура библиотеки: одна декодированная выписка MT940.
///
/// Балансы независимы друг от друга, согласованность
/// открывающего и закрывающего баланса здесь не проверяется.
///
/// Пример использования:
/// ```no_run
/// use std::fs::File;
/// use mt940_parser::Statement;
///
/// let file = File::open("statement.sta")?;
/// let statement = Statement::from_mt940(file)?;
/// println!("{statement}");
/// # Ok::<(), mt940_parser::ParseError>(())
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Statement {
    /// :25: идентификатор счёта (IBAN)
    pub account_id: String,
    /// :28C: номер выписки
    pub statement_number: String,
    /// :60F: открывающий баланс
    pub opening_balance: BalanceLine,
    /// :62F: закрывающий баланс
    pub closing_balance: BalanceLine,
    /// :64: доступный баланс, есть не во всех файлах
    pub available_balance: Option<BalanceLine>,
    /// проводки в порядке следования в файле
    pub transactions: Vec<Transaction>,
}

impl Statement {
    /// Валюта выписки (берётся из открывающего баланса)
    pub fn currency(&self) -> &str {
        &self.opening_balance.currency
    }
}

/// Поля из строки :61:
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CoreFields {
    /// месяц проводки, YYYY-MM
    pub accounting_month: String,
    /// дата проводки, YYYY-MM-DD
    pub accounting_date: String,
    /// дата валютирования, YYYY-MM-DD
    pub value_date: String,
    /// сумма со знаком, "-1234.56"
    pub amount: String,
    /// код операции банка с кавычкой: "'S202"
    pub reference_code: String,
    /// номер операции в банке с кавычкой: "'123456789"
    pub transaction_id: String,
    /// хвост строки после номера операции
    pub rest: String,
}

/// Поля из первой строки :86:
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryFields {
    /// трёхзначный код операции с кавычкой: "'020"
    pub sub_code: String,
    /// внешний идентификатор с кавычкой
    pub external_id: Option<String>,
    /// валюта операции для валютных проводок
    pub currency: Option<String>,
    /// сумма в валюте операции, с десятичной точкой
    pub amount: Option<String>,
    /// всё, что осталось после разобранных полей
    pub rest: String,
}

/// Поля из блока подполей `~NN` (вторая и следующие строки :86:)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailFields {
    pub code: String,
    /// назначение платежа
    pub title: String,
    /// референс платежа с кавычкой
    pub reference: String,
    pub nrb: String,
    pub nrozl: String,
    pub nrach: String,
    /// имя контрагента
    pub name: String,
    /// дубль кода операции, только для сверки с [`SummaryFields::sub_code`]
    pub sub_code: Option<String>,
    /// IBAN контрагента
    pub iban: String,
    /// банк не передаёт BIC в подполях, поле остаётся пустым
    pub bic: String,
    /// комиссия
    pub fee: String,
    /// дубль курса, только для сверки с [`Transaction::exchange_rate`]
    pub exchange_rate: Option<String>,
}

/// Сырые тексты проводки, как они пришли из файла
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawBlocks {
    /// значение :61:
    pub primary: String,
    /// первая строка :86:
    pub summary: String,
    /// остальные строки :86: и строки продолжения, склеенные подряд
    pub details: String,
}

/// Расхождение между двумя независимыми копиями одного поля.
///
/// Оба значения сохраняются: какое из них верное, решает человек.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Discrepancy {
    /// код операции из :86: не совпал с подполем ~34
    SubCode { summary: Option<String>, details: String },
    /// курс из строки KURS не совпал с подполем ~61
    ExchangeRate { primary: Option<String>, details: String },
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discrepancy::SubCode { summary, details } => write!(
                f,
                "sub-code {} != {details}",
                summary.as_deref().unwrap_or("<none>")
            ),
            Discrepancy::ExchangeRate { primary, details } => write!(
                f,
                "exchange rate {} != {details}",
                primary.as_deref().unwrap_or("<none>")
            ),
        }
    }
}

/// Одна проводка выписки.
///
/// Каждая группа полей - результат отдельного этапа разбора и равна `None`,
/// если этап не смог разобрать свой кусок текста. Такая проводка всё равно попадает в выписку.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    /// метка счёта: "ING PLN"
    pub account_name: String,
    /// валюта счёта (из выписки)
    pub account_currency: String,
    /// курс из строки KURS
    pub exchange_rate: Option<String>,
    pub core: Option<CoreFields>,
    pub summary: Option<SummaryFields>,
    pub details: Option<DetailFields>,
    pub raw: RawBlocks,
    pub discrepancies: Vec<Discrepancy>,
    /// идентичность проводки для дедупликации, см. [`crate::digest`]
    pub digest: Digest,
}

impl Transaction {
    pub fn accounting_month(&self) -> &str {
        self.core.as_ref().map_or("", |c| c.accounting_month.as_str())
    }

    pub fn accounting_date(&self) -> &str {
        self.core.as_ref().map_or("", |c| c.accounting_date.as_str())
    }

    pub fn value_date(&self) -> &str {
        self.core.as_ref().map_or("", |c| c.value_date.as_str())
    }

    pub fn amount(&self) -> &str {
        self.core.as_ref().map_or("", |c| c.amount.as_str())
    }

    pub fn reference_code(&self) -> &str {
        self.core.as_ref().map_or("", |c| c.reference_code.as_str())
    }

    pub fn transaction_id(&self) -> &str {
        self.core.as_ref().map_or("", |c| c.transaction_id.as_str())
    }

    pub fn sub_code(&self) -> &str {
        self.summary.as_ref().map_or("", |s| s.sub_code.as_str())
    }

    pub fn external_id(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|s| s.external_id.as_deref())
            .unwrap_or("")
    }

    pub fn cross_currency(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|s| s.currency.as_deref())
            .unwrap_or("")
    }

    pub fn cross_amount(&self) -> &str {
        self.summary
            .as_ref()
            .and_then(|s| s.amount.as_deref())
            .unwrap_or("")
    }

    pub fn title(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.title.as_str())
    }

    pub fn reference(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.reference.as_str())
    }

    pub fn name(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.name.as_str())
    }

    pub fn iban(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.iban.as_str())
    }

    pub fn bic(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.bic.as_str())
    }

    pub fn fee(&self) -> &str {
        self.details.as_ref().map_or("", |d| d.fee.as_str())
    }

    /// Сумма в копейках
    pub fn amount_cents(&self) -> Result<i64, ParseError> {
        parse_cents(self.amount())
    }

    pub fn has_discrepancies(&self) -> bool {
        !self.discrepancies.is_empty()
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:<10} {:>15} {} {} | {}",
            self.digest,
            self.accounting_date(),
            self.amount(),
            self.account_currency,
            self.name(),
            self.title(),
        )
    }
}

fn balance_label(b: &BalanceLine) -> String {
    b.cents().map_or_else(|_| b.amount.clone(), format_cents)
}

impl fmt::Display for Statement {
    /// Однострочная сводка: счёт, номер, валюта, период, балансы, число проводок
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | #{} | {} {}..{} | {} -> {} | {} transactions",
            self.account_id,
            self.statement_number,
            self.currency(),
            self.opening_balance.date,
            self.closing_balance.date,
            balance_label(&self.opening_balance),
            balance_label(&self.closing_balance),
            self.transactions.len(),
        )
    }
}
