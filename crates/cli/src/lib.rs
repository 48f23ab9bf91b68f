pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stockroom_core::config::{AppConfig, LoadOptions, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "stockroom",
    about = "Stockroom product catalog CLI",
    long_about = "Run the catalog demonstration, inspect persisted products, and show effective configuration.",
    after_help = "Examples:\n  stockroom demo\n  stockroom list\n  stockroom get --id 2\n  stockroom config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run the add/update/delete demonstration against the configured store")]
    Demo,
    #[command(about = "Print every product in the configured store")]
    List,
    #[command(about = "Print a single product by id")]
    Get {
        #[arg(long, help = "Identifier of the product to show")]
        id: u64,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    if let Ok(config) = AppConfig::load(LoadOptions::default()) {
        if let Err(error) = init_logging(&config.logging) {
            eprintln!("{error:#}");
        }
    }
    tracing::debug!(event_name = "cli.command.started", command = ?cli.command, "running command");

    let result = match cli.command {
        Command::Demo => commands::demo::run(),
        Command::List => commands::catalog::list(),
        Command::Get { id } => commands::catalog::get(id),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber on stderr. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(logging: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.trim().to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(filter);

    let installed = match logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|error| anyhow::anyhow!("failed to initialize logging: {error}"))
}
