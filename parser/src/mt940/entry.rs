use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::details::SubTags;
use super::utils::{DateNormalizer, is_calendar_date};
use crate::digest::Digest;
use crate::model::{CoreFields, DetailFields, Discrepancy, RawBlocks, SummaryFields, Transaction};
use crate::utils::normalize_decimal;

// value date, entry date (MMDD), C/D, сумма, код S###, номер операции, хвост
static PRIMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{6})([0-9]{4})([CD])([0-9]{1,13},[0-9]{1,13})(S[0-9]{3})([0-9]{1,13})(.*)")
        .expect("primary :61: pattern must compile")
});

// код операции, внешний id, валюта, сумма в валюте, хвост
static SUMMARY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{3})([0-9a-zA-Z_/]{6})?([a-zA-Z]{3})?([0-9]{1,12},[0-9]{1,12})?(.*)")
        .expect("summary :86: pattern must compile")
});

/// Проводка, которая ещё собирается из строк файла
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RawEntry {
    pub(crate) account_name: String,
    pub(crate) account_currency: String,
    pub(crate) exchange_rate: Option<String>,
    pub(crate) primary: String,
    pub(crate) summary: String,
    pub(crate) details: String,
}

impl RawEntry {
    pub(crate) fn new(primary: &str, account_currency: &str, account_name: String) -> Self {
        Self {
            account_name,
            account_currency: account_currency.to_string(),
            primary: primary.to_string(),
            ..Self::default()
        }
    }

    /// Разбирает накопленный текст в готовую проводку и считает её дайджест
    pub(crate) fn finalize(self, dates: &DateNormalizer) -> Transaction {
        let core = parse_primary(&self.primary, dates);
        if core.is_none() {
            warn!(
                line = %self.primary,
                "transaction line does not match the expected layout, core fields left empty"
            );
        }

        let summary = parse_summary(&self.summary);
        if summary.is_none() {
            if self.summary.is_empty() {
                debug!(line = %self.primary, "transaction has no summary line");
            } else {
                warn!(
                    summary = %self.summary,
                    "summary line does not match the expected layout, summary fields left empty"
                );
            }
        }

        let details = (!self.details.is_empty())
            .then(|| SubTags::parse(&self.details).to_detail_fields());

        let discrepancies = cross_validate(
            summary.as_ref(),
            details.as_ref(),
            self.exchange_rate.as_deref(),
        );
        for d in &discrepancies {
            warn!(line = %self.primary, discrepancy = %d, "cross-check mismatch, both values kept");
        }

        let mut tx = Transaction {
            account_name: self.account_name,
            account_currency: self.account_currency,
            exchange_rate: self.exchange_rate,
            core,
            summary,
            details,
            raw: RawBlocks {
                primary: self.primary,
                summary: self.summary,
                details: self.details,
            },
            discrepancies,
            digest: Digest::default(),
        };
        tx.digest = tx.compute_digest();
        tx
    }
}

pub(crate) fn parse_primary(raw: &str, dates: &DateNormalizer) -> Option<CoreFields> {
    let caps = PRIMARY_RE.captures(raw)?;

    let value_date = dates.normalize(&caps[1]);
    let accounting_date = dates.normalize_with_sibling(&caps[2], &value_date);
    for date in [&value_date, &accounting_date] {
        if !is_calendar_date(date) {
            warn!(date = %date, line = raw, "not a calendar date, kept as text");
        }
    }
    let accounting_month = accounting_date
        .get(0..7)
        .unwrap_or(&accounting_date)
        .to_string();

    let sign = if &caps[3] == "D" { "-" } else { "" };
    let amount = format!("{sign}{}", normalize_decimal(&caps[4]));

    Some(CoreFields {
        accounting_month,
        accounting_date,
        value_date,
        amount,
        reference_code: format!("'{}", &caps[5]),
        transaction_id: format!("'{}", &caps[6]),
        rest: caps[7].to_string(),
    })
}

pub(crate) fn parse_summary(raw: &str) -> Option<SummaryFields> {
    let caps = SUMMARY_RE.captures(raw)?;

    Some(SummaryFields {
        sub_code: format!("'{}", &caps[1]),
        external_id: caps.get(2).map(|m| format!("'{}", m.as_str())),
        currency: caps.get(3).map(|m| m.as_str().to_string()),
        amount: caps.get(4).map(|m| normalize_decimal(m.as_str())),
        rest: caps.get(5).map_or_else(String::new, |m| m.as_str().to_string()),
    })
}

/// Сверяет дубли полей из подполей :86: с основными значениями
pub(crate) fn cross_validate(
    summary: Option<&SummaryFields>,
    details: Option<&DetailFields>,
    exchange_rate: Option<&str>,
) -> Vec<Discrepancy> {
    let mut out = Vec::new();
    let Some(details) = details else {
        return out;
    };

    if let Some(dup) = &details.sub_code {
        let primary = summary.map(|s| s.sub_code.as_str());
        if primary != Some(dup.as_str()) {
            out.push(Discrepancy::SubCode {
                summary: primary.map(str::to_string),
                details: dup.clone(),
            });
        }
    }

    if let Some(dup) = &details.exchange_rate
        && exchange_rate != Some(dup.as_str())
    {
        out.push(Discrepancy::ExchangeRate {
            primary: exchange_rate.map(str::to_string),
            details: dup.clone(),
        });
    }

    out
}
