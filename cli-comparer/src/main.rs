use clap::Parser;
use mt940_parser::{DecoderConfig, Digest, Ledger, Mt940Decoder, ParseError, Statement};
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mt940_comparer",
    version,
    about = "Сравнивает проводки двух выписок MT940 по дайджесту.",
    long_about = None,
)]
struct Args {
    /// Входной файл 1
    #[arg(long)]
    file1: PathBuf,

    /// Входной файл 2
    #[arg(long)]
    file2: PathBuf,

    /// JSON-файл с настройками декодера
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

// логи в stderr, отчёт о сравнении в stdout
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Печатает проводки выписки, которых нет в другой
fn print_unique(label: &str, statement: &Statement, other: &HashSet<Digest>) -> usize {
    let mut count = 0;
    for tx in statement.transactions.iter().filter(|tx| !other.contains(&tx.digest)) {
        println!("только в {label}: {tx}");
        count += 1;
    }
    count
}

fn run() -> Result<(), ParseError> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DecoderConfig::load(path)?,
        None => DecoderConfig::default(),
    };
    let decoder = Mt940Decoder::new(config)?;

    let statement1 = decoder.decode_file(&args.file1)?;
    let statement2 = decoder.decode_file(&args.file2)?;

    println!("file1: {statement1}");
    println!("file2: {statement2}");

    let digests1: HashSet<_> = statement1.transactions.iter().map(|tx| tx.digest).collect();
    let digests2: HashSet<_> = statement2.transactions.iter().map(|tx| tx.digest).collect();

    let only1 = print_unique("file1", &statement1, &digests2);
    let only2 = print_unique("file2", &statement2, &digests1);

    let mut ledger = Ledger::new();
    ledger.ingest(statement1);
    let report = ledger.ingest(statement2);

    for tx in ledger.iter().filter(|tx| tx.has_discrepancies()) {
        for d in &tx.discrepancies {
            println!("расхождение в {}: {d}", tx.digest);
        }
    }

    println!(
        "общих: {}, только в file1: {only1}, только в file2: {only2}, всего уникальных: {}",
        report.duplicates.len(),
        ledger.len()
    );

    if only1 == 0 && only2 == 0 {
        println!("statements are equal")
    }

    Ok(())
}
