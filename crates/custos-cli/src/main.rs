//! Custos CLI - reports deprecated usage in declarative cloud policies.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

fn main() -> Result<()> {
    // Logs go to stderr so reports on stdout stay clean.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "custos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check(args) => commands::check::run(&args),
        Commands::Rules(args) => commands::rules::run(&args),
        Commands::Version => {
            println!("custos {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
