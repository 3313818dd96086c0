use cardcheck::application::options::{ServiceRegistry, ValidatorOptions};
use cardcheck::interfaces::csv::card_reader::CardReader;
use cardcheck::interfaces::csv::report_writer::ReportWriter;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input CSV file with `id,number` columns
    input: PathBuf,

    /// Restrict validation to this institute (repeatable). Overrides the options file.
    #[arg(long = "type", value_name = "INSTITUTE")]
    types: Vec<String>,

    /// JSON options document, e.g. {"type": ["Visa", "JCB"]}
    #[arg(long)]
    options: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "cardcheck=info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(io::stderr().is_terminal()),
        )
        .init();

    let cli = Cli::parse();

    let options = match &cli.options {
        Some(path) => ValidatorOptions::from_reader(File::open(path).into_diagnostic()?)
            .into_diagnostic()?,
        None => ValidatorOptions::default(),
    };
    // No named services ship with the binary
    let mut validator = options.build(&ServiceRegistry::new()).into_diagnostic()?;
    if !cli.types.is_empty() {
        validator.set_institutes(cli.types).into_diagnostic()?;
    }

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CardReader::new(file);
    let stdout = io::stdout();
    let mut writer = ReportWriter::new(stdout.lock());

    let (mut checked, mut valid) = (0usize, 0usize);
    for record in reader.records() {
        match record {
            Ok(record) => {
                let result = validator.validate(&record.number);
                checked += 1;
                valid += usize::from(result.is_valid);
                writer.write(&record.id, &result).into_diagnostic()?;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Error reading card record");
            }
        }
    }
    writer.finish().into_diagnostic()?;

    tracing::info!(checked, valid, "validation finished");
    Ok(())
}
