mod common;
mod csv_helpers;

use csv::{Writer, WriterBuilder};
use std::io::Write;

use crate::error::ParseError;
use crate::ledger::Ledger;
use crate::model::Statement;
use csv_helpers::{LEDGER_HEADERS, LedgerRow};

pub(crate) use common::format_cents;

impl Statement {
    /// Записывает проводки выписки в CSV: строка заголовков и по строке на проводку.
    ///
    /// Первая колонка - дайджест проводки в hex. Заголовок пишется и для пустой выписки.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ParseError> {
        let mut wtr = csv_writer(writer)?;

        for tx in &self.transactions {
            wtr.serialize(LedgerRow::new(&self.account_id, &self.statement_number, tx))?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Записывает всю выписку в JSON, включая сырые блоки и расхождения
    pub fn write_json<W: Write>(&self, writer: W) -> Result<(), ParseError> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }
}

impl Ledger {
    /// Записывает все накопленные проводки в CSV в порядке добавления
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ParseError> {
        let mut wtr = csv_writer(writer)?;

        for entry in self.entries() {
            wtr.serialize(LedgerRow::new(
                &entry.account_id,
                &entry.statement_number,
                &entry.transaction,
            ))?;
        }

        wtr.flush()?;
        Ok(())
    }
}

// заголовки пишем сами: serde-заголовок появился бы только вместе с первой строкой
fn csv_writer<W: Write>(writer: W) -> Result<Writer<W>, ParseError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(LEDGER_HEADERS)?;
    Ok(wtr)
}
