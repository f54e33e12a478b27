#![allow(clippy::pedantic)]
#![allow(clippy::unused_async)]

use std::path::Path;

use anyhow::Context;
use clap::Parser;
use scrap_config::ScrapConfig;
use scrap_lifecycle::LifecycleError;

mod cli;
mod commands;
mod context;
mod output;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    let format = cli.format;
    if let Err(error) = run(cli).await {
        // lifecycle failures are part of the envelope contract; anything else is a CLI error
        if let Some(lifecycle) = error.downcast_ref::<LifecycleError>() {
            let _ = output::failure(lifecycle, format);
        } else {
            eprintln!("scrap error: {error:#}");
        }
        std::process::exit(1);
    }
}

async fn run(cli: cli::Cli) -> anyhow::Result<()> {
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    let config = load_config(flags.config.as_deref())?;
    context::warn_unconfigured(&config);

    let ctx = context::AppContext::init(config)
        .await
        .context("failed to open the scrapbook stores")?;

    commands::dispatch::dispatch(cli.command, &ctx, &flags).await
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ScrapConfig> {
    let config = match path {
        Some(path) => ScrapConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ScrapConfig::load_with_dotenv().context("failed to load configuration")?,
    };
    Ok(config)
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("SCRAP_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
