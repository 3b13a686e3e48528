// cos-upload - upload local files to a Cloud Object Storage bucket

mod cli;
mod config;
mod progress;

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use config::UploadToolConfig;
use cos_upload::{CosConnector, HmacCredentials, UploadError, Uploader};
use progress::ConsoleProgress;

const ACCESS_KEY_ID_VAR: &str = "AWS_ACCESS_KEY_ID";
const SECRET_ACCESS_KEY_VAR: &str = "AWS_SECRET_ACCESS_KEY";

/// Send diagnostics to stderr, filtered by RUST_LOG (default: warn)
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Also bridges records from the `log` facade used by the library
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Read HMAC credentials from the environment
fn credentials_from_env() -> Option<HmacCredentials> {
    let access_key_id = std::env::var(ACCESS_KEY_ID_VAR).ok()?;
    let secret_access_key = std::env::var(SECRET_ACCESS_KEY_VAR).ok()?;
    Some(HmacCredentials::new(access_key_id, secret_access_key))
}

async fn run(
    cli: &Cli,
    config: UploadToolConfig,
    credentials: HmacCredentials,
) -> Result<usize, UploadError> {
    let connector = Arc::new(CosConnector::new(config.store));
    let uploader = Uploader::new(connector, credentials).with_progress(Arc::new(ConsoleProgress));

    uploader.upload(&cli.to_request()).await
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let Some(credentials) = credentials_from_env() else {
        println!(
            "Error. Environment variables {} and {} must be set.",
            ACCESS_KEY_ID_VAR, SECRET_ACCESS_KEY_VAR
        );
        return ExitCode::FAILURE;
    };

    // Show the whole context chain for config errors
    let config = match UploadToolConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            println!("Error. {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(&cli, config, credentials).await {
        Ok(count) => {
            log::info!("{} files uploaded to {}", count, cli.bucket);
            ExitCode::SUCCESS
        }
        Err(e) => {
            println!("Error. {}", e);
            ExitCode::FAILURE
        }
    }
}
