use clap::{Parser, ValueEnum};
use mt940_parser::{DecoderConfig, Mt940Decoder, ParseError};
use std::io;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "mt940_converter",
    version,
    about = "Конвертирует выписку MT940 в CSV или JSON.",
    long_about = None,
)]
struct Args {
    /// Входной файл MT940
    #[arg(long)]
    input: PathBuf,

    /// Формат выходных данных
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    output_format: Format,

    /// JSON-файл с настройками декодера
    #[arg(long)]
    config: Option<PathBuf>,
}

/// Поддерживаемые форматы вывода
#[derive(Copy, Clone, Debug, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() {
    init_logging();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

// логи в stderr, чтобы не смешивать их с выгрузкой в stdout
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), ParseError> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => DecoderConfig::load(path)?,
        None => DecoderConfig::default(),
    };
    let decoder = Mt940Decoder::new(config)?;

    let statement = decoder.decode_file(&args.input)?;
    eprintln!("{statement}");

    let stdout = io::stdout();
    let handle = stdout.lock();

    match args.output_format {
        Format::Csv => statement.write_csv(handle)?,
        Format::Json => statement.write_json(handle)?,
    }

    Ok(())
}
