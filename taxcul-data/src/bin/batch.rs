use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use taxcul_core::api::Session;
use taxcul_core::format::{DEFAULT_CURRENCY, format_currency};
use taxcul_data::{BatchLoader, BatchRunner};
use taxcul_http::HttpApi;

/// Submit calculator input from a CSV file to the TaxCul backend.
///
/// The CSV file needs a `calculator` column holding the endpoint slug
/// (e.g. `withholding/interest`, `vat/taxable-supplies`). Every other
/// column is sent as a calculator field.
#[derive(Parser, Debug)]
#[command(name = "taxcul-batch")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the CSV file containing the submissions
    #[arg(short, long)]
    file: PathBuf,

    /// Backend base URL
    #[arg(short, long, env = "TAXCUL_API_URL", default_value = "http://localhost:8000/api")]
    api_url: String,

    /// Bearer token to send with every request
    #[arg(short, long)]
    token: Option<String>,

    /// Currency code used when printing amounts
    #[arg(short, long, default_value = DEFAULT_CURRENCY)]
    currency: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let session = match &args.token {
        Some(token) => Session::with_token(token),
        None => Session::in_memory(),
    };
    let api = HttpApi::new(&args.api_url, session)
        .with_context(|| format!("Invalid API URL: {}", args.api_url))?;

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open: {}", args.file.display()))?;
    let rows = BatchLoader::parse(file)
        .with_context(|| format!("Failed to parse CSV: {}", args.file.display()))?;

    println!("Parsed {} submissions from CSV", rows.len());

    let outcomes = BatchRunner::submit(&api, &rows).await;

    let mut failed = 0;
    for outcome in &outcomes {
        match &outcome.result {
            Ok(result) => println!(
                "row {:>3}  {:<34} {}",
                outcome.row,
                outcome.tax_type.name(),
                format_currency(result.amount(), &args.currency)
            ),
            Err(e) => {
                failed += 1;
                println!(
                    "row {:>3}  {:<34} {} ({e})",
                    outcome.row,
                    outcome.tax_type.name(),
                    outcome.tax_type.failure_message()
                );
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} submissions failed", outcomes.len());
    }

    println!("Successfully submitted {} calculations.", outcomes.len());
    Ok(())
}
