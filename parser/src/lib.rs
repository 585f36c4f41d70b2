pub mod config;
pub mod digest;
pub mod error;
pub mod ledger;
pub mod model;
pub mod mt940;
pub mod serialization;

mod utils;

pub use crate::config::DecoderConfig;
pub use crate::digest::Digest;
pub use crate::error::ParseError;
pub use crate::ledger::{IngestReport, Ledger, LedgerEntry};
pub use crate::model::{
    BalanceLine, CoreFields, DetailFields, Discrepancy, RawBlocks, Statement, SummaryFields,
    Transaction,
};
pub use crate::mt940::Mt940Decoder;
pub use crate::utils::parse_cents;
