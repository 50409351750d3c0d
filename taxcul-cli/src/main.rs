use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::debug;

use taxcul_cli::app::{self, CommandError};
use taxcul_cli::cli::Cli;
use taxcul_cli::config::{API_URL_ENV, Overrides, load_settings};
use taxcul_cli::{logging, output};
use taxcul_core::api::TokenStoreRegistry;
use taxcul_http::connect;

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let overrides = Overrides {
        api_url_flag: cli.api_url.clone(),
        api_url_env: std::env::var(API_URL_ENV).ok(),
        log_level: cli.log_level.clone(),
        log_file: cli.log_file.clone(),
    };
    let settings =
        load_settings(cli.config.clone(), &overrides).context("Failed to load configuration")?;

    logging::init(&settings.logging).context("Failed to initialise logging")?;
    // An explicit flag wins over RUST_LOG.
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }

    debug!(
        api_url = %settings.client.api_url,
        session_backend = %settings.client.session.backend,
        "starting"
    );
    let api = connect(&settings.client, &TokenStoreRegistry::with_builtin())
        .with_context(|| format!("Failed to set up the API client for {}", settings.client.api_url))?;

    match app::run(cli.command, &api, &cli.currency).await {
        Ok(text) => {
            print!("{text}");
            Ok(ExitCode::SUCCESS)
        }
        Err(CommandError::Invalid(result)) => {
            eprintln!("Please correct the following:");
            eprint!("{}", output::validation(&result));
            Ok(ExitCode::FAILURE)
        }
        Err(CommandError::BatchFailed {
            report,
            failed,
            total,
        }) => {
            print!("{report}");
            eprintln!("{failed} of {total} submissions failed");
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
