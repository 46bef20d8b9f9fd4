use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::error::{RangepilotError, Result};
use crate::server;

/// Rangepilot - drive a real browser through range-builder filters over HTTP
#[derive(Parser)]
#[command(name = "rangepilot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Address to bind the API server on
    #[arg(long, env = "RANGEPILOT_SERVER_HOST", global = true)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "RANGEPILOT_SERVER_PORT", global = true)]
    pub port: Option<u16>,

    /// Run the browser headless
    #[arg(long, env = "RANGEPILOT_BROWSER_HEADLESS", global = true)]
    pub headless: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    Serve,

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the merged configuration
    Show,

    /// Show the configuration file path
    Path,
}

impl Cli {
    pub async fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Serve => {
                let mut config = Config::load()?;
                if let Some(host) = &self.host {
                    config.server.host = host.clone();
                }
                if let Some(port) = self.port {
                    config.server.port = port;
                }
                if self.headless {
                    config.browser.headless = true;
                }
                server::serve(config).await
            }
            Commands::Config { command } => match command {
                ConfigCommands::Show => {
                    let config = Config::load()?;
                    let rendered = toml::to_string_pretty(&config)
                        .map_err(|e| RangepilotError::ConfigError(e.to_string()))?;
                    println!("{rendered}");
                    Ok(())
                }
                ConfigCommands::Path => {
                    println!("{}", Config::config_path().display());
                    Ok(())
                }
            },
        }
    }
}
