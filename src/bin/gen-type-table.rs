use clap::Parser;
use posting_scraper::typegen::{self, render};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Reads `IDENTIFIER VALUE` pairs and writes the type-category cast tables.
///
/// Missing or ambiguous identifiers are reported on stderr; the table is still
/// written without them.
#[derive(Parser)]
#[command(name = "gen-type-table")]
#[command(version)]
struct Cli {
    /// Read pairs from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,
    /// Symbol prefix for the generated arrays, table and cast callbacks
    #[arg(long, default_value = render::DEFAULT_PREFIX)]
    prefix: String,
    /// Exit with status 1 if any diagnostic was reported
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let input = match &cli.input {
        Some(path) => typegen::read_input_file(path)?,
        None => typegen::read_input(io::stdin().lock())?,
    };

    let resolution = typegen::generate(&input);
    for diagnostic in &resolution.diagnostics {
        eprintln!("{}", diagnostic);
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", render::render(&resolution, &cli.prefix))?;
    stdout.flush()?;

    if cli.strict && !resolution.diagnostics.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}
