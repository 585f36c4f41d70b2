//! Накопитель проводок из нескольких выписок.
//!
//! Выписки за соседние периоды часто перекрываются. Проводка с уже известным
//! дайджестом повторно не добавляется.

use std::collections::HashSet;
use tracing::debug;

use crate::digest::Digest;
use crate::model::{Statement, Transaction};

/// Проводка вместе с выпиской, из которой она взята
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub account_id: String,
    pub statement_number: String,
    pub transaction: Transaction,
}

/// Итог добавления одной выписки
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// сколько проводок добавлено
    pub added: usize,
    /// дайджесты проводок, которые уже были в журнале
    pub duplicates: Vec<Digest>,
}

#[derive(Debug, Clone, Default)]
pub struct Ledger {
    seen: HashSet<Digest>,
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Добавляет проводки выписки, пропуская уже известные.
    ///
    /// Повтор внутри одной выписки тоже считается дублем.
    pub fn ingest(&mut self, statement: Statement) -> IngestReport {
        let mut report = IngestReport::default();
        let Statement {
            account_id,
            statement_number,
            transactions,
            ..
        } = statement;

        for transaction in transactions {
            if !self.seen.insert(transaction.digest) {
                debug!(
                    digest = %transaction.digest,
                    account = %account_id,
                    "duplicate transaction skipped"
                );
                report.duplicates.push(transaction.digest);
                continue;
            }
            self.entries.push(LedgerEntry {
                account_id: account_id.clone(),
                statement_number: statement_number.clone(),
                transaction,
            });
            report.added += 1;
        }

        report
    }

    pub fn contains(&self, digest: &Digest) -> bool {
        self.seen.contains(digest)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Проводки в порядке добавления
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().map(|e| &e.transaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statement(number: &str, lines: &[&str]) -> Statement {
        let mut input = format!(":20:MT940\n:25:/PL12\n:28C:{number}\n:60F:C240601PLN0,00\n");
        for l in lines {
            input.push_str(l);
            input.push('\n');
        }
        Statement::from_mt940(input.as_bytes()).unwrap()
    }

    #[test]
    fn overlapping_statements_are_deduplicated() {
        let first = statement(
            "00001",
            &[":61:2406010601C1,00S0201", ":61:2406020602C2,00S0202"],
        );
        let second = statement(
            "00002",
            &[":61:2406020602C2,00S0202", ":61:2406030603C3,00S0203"],
        );
        let shared = second.transactions[0].digest;

        let mut ledger = Ledger::new();
        assert_eq!(ledger.ingest(first).added, 2);

        let report = ledger.ingest(second);
        assert_eq!(report.added, 1);
        assert_eq!(report.duplicates, vec![shared]);

        assert_eq!(ledger.len(), 3);
        assert!(ledger.contains(&shared));
        assert_eq!(ledger.entries()[2].statement_number, "00002");
    }

    #[test]
    fn repeated_transaction_inside_one_statement_is_a_duplicate() {
        let stmt = statement(
            "00001",
            &[":61:2406010601C1,00S0201", ":61:2406010601C1,00S0201"],
        );

        let mut ledger = Ledger::new();
        let report = ledger.ingest(stmt);

        assert_eq!(report.added, 1);
        assert_eq!(report.duplicates.len(), 1);
    }

    #[test]
    fn same_operation_differs_by_amount() {
        let stmt = statement(
            "00001",
            &[":61:2406010601C1,00S0201", ":61:2406010601C1,01S0201"],
        );

        let mut ledger = Ledger::new();
        assert_eq!(ledger.ingest(stmt).added, 2);
        assert_eq!(ledger.iter().count(), 2);
    }

    #[test]
    fn new_ledger_is_empty() {
        let ledger = Ledger::new();
        assert!(ledger.is_empty());
        assert!(!ledger.contains(&Digest::default()));
    }
}
