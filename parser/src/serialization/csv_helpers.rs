use serde::Serialize;

use crate::model::Transaction;

/// Заголовки колонок, в порядке полей [`LedgerRow`]
pub(crate) const LEDGER_HEADERS: [&str; 22] = [
    "digest",
    "account_id",
    "statement_number",
    "account_name",
    "accounting_month",
    "accounting_date",
    "value_date",
    "amount",
    "currency",
    "reference_code",
    "transaction_id",
    "sub_code",
    "external_id",
    "cross_currency",
    "cross_amount",
    "exchange_rate",
    "title",
    "reference",
    "name",
    "iban",
    "fee",
    "discrepancies",
];

/// Одна строка табличной выгрузки.
///
/// Порядок полей задаёт порядок колонок и совпадает с [`LEDGER_HEADERS`].
#[derive(Debug, Serialize)]
pub(crate) struct LedgerRow<'a> {
    pub(crate) digest: String,
    pub(crate) account_id: &'a str,
    pub(crate) statement_number: &'a str,
    pub(crate) account_name: &'a str,
    pub(crate) accounting_month: &'a str,
    pub(crate) accounting_date: &'a str,
    pub(crate) value_date: &'a str,
    pub(crate) amount: &'a str,
    pub(crate) currency: &'a str,
    pub(crate) reference_code: &'a str,
    pub(crate) transaction_id: &'a str,
    pub(crate) sub_code: &'a str,
    pub(crate) external_id: &'a str,
    pub(crate) cross_currency: &'a str,
    pub(crate) cross_amount: &'a str,
    pub(crate) exchange_rate: &'a str,
    pub(crate) title: &'a str,
    pub(crate) reference: &'a str,
    pub(crate) name: &'a str,
    pub(crate) iban: &'a str,
    pub(crate) fee: &'a str,
    /// расхождения сверки через "; "
    pub(crate) discrepancies: String,
}

impl<'a> LedgerRow<'a> {
    pub(crate) fn new(account_id: &'a str, statement_number: &'a str, tx: &'a Transaction) -> Self {
        let discrepancies = tx
            .discrepancies
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        Self {
            digest: tx.digest.to_hex(),
            account_id,
            statement_number,
            account_name: &tx.account_name,
            accounting_month: tx.accounting_month(),
            accounting_date: tx.accounting_date(),
            value_date: tx.value_date(),
            amount: tx.amount(),
            currency: &tx.account_currency,
            reference_code: tx.reference_code(),
            transaction_id: tx.transaction_id(),
            sub_code: tx.sub_code(),
            external_id: tx.external_id(),
            cross_currency: tx.cross_currency(),
            cross_amount: tx.cross_amount(),
            exchange_rate: tx.exchange_rate.as_deref().unwrap_or(""),
            title: tx.title(),
            reference: tx.reference(),
            name: tx.name(),
            iban: tx.iban(),
            fee: tx.fee(),
            discrepancies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Statement;

    #[test]
    fn headers_match_serialized_field_names() {
        let input = ":60F:C240601PLN0,00\n:61:2406010601C1,00S0201\n";
        let stmt = Statement::from_mt940(input.as_bytes()).unwrap();

        let mut wtr = csv::Writer::from_writer(Vec::new());
        wtr.serialize(LedgerRow::new("PL12", "00001", &stmt.transactions[0]))
            .unwrap();
        let out = String::from_utf8(wtr.into_inner().unwrap()).unwrap();

        assert_eq!(out.lines().next(), Some(LEDGER_HEADERS.join(",").as_str()));
    }
}
