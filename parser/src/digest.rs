//! Идентичность проводки.
//!
//! Дайджест - первые 16 байт SHA-256 от фиксированного списка полей,
//! склеенных через байт `0x00`. Сканер строк удаляет NUL из входа,
//! поэтому разделитель не встречается ни в одном поле.
//! Две проводки с одинаковым дайджестом считаются одной и той же операцией,
//! из какого бы файла они ни были прочитаны.

use serde::{Serialize, Serializer};
use sha2::{Digest as _, Sha256};
use std::fmt;

use crate::model::Transaction;

/// Длина дайджеста в байтах (половина SHA-256)
pub const DIGEST_LEN: usize = 16;

/// Разделитель полей
pub const FIELD_SEPARATOR: u8 = 0x00;

/// Сколько полей проводки входит в дайджест
pub const HASHED_FIELD_COUNT: usize = 16;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Поля проводки в том порядке, в котором они хешируются.
///
/// Сумма входит дважды. Неразобранные поля дают пустые строки.
pub fn hashed_fields(tx: &Transaction) -> [&str; HASHED_FIELD_COUNT] {
    [
        tx.accounting_month(),
        &tx.account_name,
        tx.accounting_date(),
        tx.amount(),
        &tx.account_currency,
        tx.transaction_id(),
        tx.title(),
        tx.reference(),
        tx.name(),
        tx.iban(),
        tx.bic(),
        tx.cross_currency(),
        tx.cross_amount(),
        // дата валютирования
        tx.value_date(),
        tx.external_id(),
        tx.amount(),
    ]
}

/// Хеширует произвольный упорядоченный список полей
pub fn digest_fields(fields: &[&str]) -> Digest {
    let mut hasher = Sha256::new();
    for (idx, field) in fields.iter().enumerate() {
        if idx > 0 {
            hasher.update([FIELD_SEPARATOR]);
        }
        hasher.update(field.as_bytes());
    }
    let full = hasher.finalize();

    let mut out = [0u8; DIGEST_LEN];
    out.copy_from_slice(&full[..DIGEST_LEN]);
    Digest(out)
}

impl Transaction {
    /// Считает дайджест по текущим значениям полей
    pub fn compute_digest(&self) -> Digest {
        digest_fields(&hashed_fields(self))
    }
}
