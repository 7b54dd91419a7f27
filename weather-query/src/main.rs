//! Binary crate for the `weather-query` service.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the HTTP API for the chat frontend
//! - Interactive credential configuration

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Read `.env` before the filter so RUST_LOG can live there too.
    let dotenv = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded .env"),
        Err(err) => tracing::debug!(%err, "no .env loaded"),
    }

    let cmd = cli::Cli::parse();
    cmd.run().await
}
