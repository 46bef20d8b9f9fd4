use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rangepilot::cli::Cli;
use rangepilot::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    // Quiet chromiumoxide's conn/handler targets by default: newer Chrome
    // versions emit CDP events the library doesn't recognize, and each one
    // logs an error
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info")
            .add_directive("chromiumoxide::conn=warn".parse().unwrap())
            .add_directive("chromiumoxide::handler=warn".parse().unwrap())
    });

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let cli = Cli::parse();
    cli.run().await
}
