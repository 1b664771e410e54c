//! Pokedraft
//!
//! Command line entry point: one-shot search, an interactive drafting
//! session on the terminal, or the HTTP API.

use clap::{Parser, Subcommand};
use pokedraft_core::{DraftConfig, DraftEvent, DraftSession};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::sync::{broadcast, mpsc};
use tracing_subscriber::EnvFilter;

mod api;
mod repl;
#[cfg(test)]
mod testing;

#[derive(Parser, Clone)]
#[command(author, version, about = "Pokedraft - build a team of six Pokemon")]
struct Args {
    /// JSON config file; environment variables apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Base URL of the Pokemon catalog
    #[arg(long, global = true)]
    catalog_url: Option<String>,
    /// Base URL of the team backend
    #[arg(long, global = true)]
    backend_url: Option<String>,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Clone)]
enum CliCommand {
    /// Print the names matching a query
    Search { query: String },
    /// Draft a team interactively (default)
    Build,
    /// Serve the drafting API
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },
}

impl Args {
    fn draft_config(&self) -> anyhow::Result<DraftConfig> {
        let mut config = match &self.config {
            Some(path) => DraftConfig::load(path)?,
            None => DraftConfig::from_env(),
        };
        if let Some(url) = &self.catalog_url {
            config = config.with_catalog_url(url);
        }
        if let Some(url) = &self.backend_url {
            config = config.with_backend_url(url);
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.draft_config()?;
    tracing::debug!(catalog = %config.catalog_url, backend = %config.backend_url, "Config loaded");

    let (event_tx, event_rx) = mpsc::channel::<DraftEvent>(256);
    let session = DraftSession::from_config(&config)?.with_event_channel(event_tx);

    match args.command.unwrap_or(CliCommand::Build) {
        CliCommand::Search { query } => {
            drop(event_rx);
            session.start().await?;
            let names = session.search(&query).await;
            if names.is_empty() {
                println!("No Pokemon match '{}'", query);
            }
            for name in names {
                println!("{}", name);
            }
        }
        CliCommand::Build => {
            let mut repl = repl::Repl::new(session, event_rx, std::io::stdout());
            repl.run(BufReader::new(tokio::io::stdin())).await?;
        }
        CliCommand::Serve { port } => {
            let session = Arc::new(session);
            // Load before accepting requests; failures surface on /status
            if let Err(e) = session.start().await {
                tracing::error!("Name index unavailable: {}", e);
            }

            let (broadcast_tx, _) = broadcast::channel::<DraftEvent>(100);
            api::bridge_events(event_rx, broadcast_tx.clone());

            api::run_server(session, broadcast_tx, port).await?;
        }
    }

    Ok(())
}
