mod cli;
mod config;
mod history;
mod llm;
mod models;
mod prediction;
mod service;
mod ui;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { local } => service::init::initialize(local)?,
        Commands::Ask {
            query,
            json,
            api_key,
            local,
            global,
        } => service::ask::ask(&query, json, api_key, local, global).await?,
        Commands::Chat {
            api_key,
            local,
            global,
        } => service::chat::chat(api_key, local, global).await?,
        Commands::History {
            clear,
            force,
            local,
            global,
        } => service::history::history(clear, force, local, global)?,
    }

    Ok(())
}

/// Logs go to stderr; the rendered output owns stdout
fn init_logging(verbose: bool) {
    let default_directive = if verbose {
        "betpredict=debug"
    } else {
        "betpredict=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
