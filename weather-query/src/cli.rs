use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode};
use weather_query_core::{Config, QueryOrchestrator, ServiceId};

use crate::server;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-query", version, about = "Answers weather questions about cities")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Address to bind; defaults to the configured host.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind; defaults to the configured port.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Answer a single question and print the result.
    Ask {
        /// Free-text question, e.g. "What's the weather in Pune?".
        query: String,
    },

    /// Store the API key for a service.
    Configure {
        /// Service short name: "openweather" or "openrouter".
        service: String,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { host, port } => {
                let mut config = Config::load()?;
                if let Some(host) = host {
                    config.server.host = host;
                }
                if let Some(port) = port {
                    config.server.port = port;
                }

                let orchestrator = QueryOrchestrator::from_config(&config)
                    .context("Failed to build query pipeline")?;
                let addr = format!("{}:{}", config.server.host, config.server.port);

                server::serve(&addr, Arc::new(orchestrator)).await?;
            }
            Command::Ask { query } => {
                let config = Config::load()?;
                let orchestrator = QueryOrchestrator::from_config(&config)
                    .context("Failed to build query pipeline")?;

                let reply = orchestrator.handle(&query).await?;
                println!("{}", reply.text);
            }
            Command::Configure { service } => {
                let id = ServiceId::try_from(service.as_str())?;

                // Only what is on disk; environment overrides must not be persisted.
                let mut config = Config::load_file()?;
                if config.is_configured(id) {
                    println!("Replacing the stored API key for {id}.");
                }

                let key = Password::new(&format!("API key for {id}:"))
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?;

                let key = key.trim();
                if key.is_empty() {
                    bail!("API key for {id} must not be empty");
                }

                config.set_api_key(id, key.to_string());
                let path = config.save()?;
                println!("Saved {id} API key to {}", path.display());
            }
        }

        Ok(())
    }
}
