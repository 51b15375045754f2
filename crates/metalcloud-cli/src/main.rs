//! metalcloud CLI
//!
//! Command-line interface for managing servers, storage pools and jobs
//! through the metalcloud API

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use metalcloud_client::HttpClient;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod confirm;
mod output;
mod watch;

use cli::Cli;
use commands::Context;
use config::{Config, Settings};
use output::Printer;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let cli = Cli::parse();
    let (config, config_path) = Config::discover(cli.config.as_deref())?;

    init_tracing(cli.verbose, &config.log_level);
    match &config_path {
        Some(path) => tracing::debug!(path = %path.display(), "loaded config"),
        None => tracing::debug!("no config file found, using defaults"),
    }

    let settings = Settings::resolve(&cli, &config)?;
    let client = HttpClient::builder(&settings.endpoint)
        .api_key(&settings.api_key)
        .timeout(settings.timeout)
        .user_agent(concat!("metalcloud-cli/", env!("CARGO_PKG_VERSION")))
        .build()
        .wrap_err_with(|| format!("invalid endpoint {}", settings.endpoint))?;
    tracing::debug!(endpoint = %client.base_url(), "client ready");

    let ctx = Context {
        client,
        printer: Printer::new(settings.format),
    };
    commands::run(cli.command, &ctx).await
}

/// Log to stderr; `RUST_LOG` wins over `-v` and the configured level
fn init_tracing(verbose: u8, configured: &str) {
    let level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
