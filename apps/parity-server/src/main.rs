use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use parity::config::{AppConfig, CliOverrides};
use parity::infra::db::redact_dsn;
use parity::logging::init_logging;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Parity Server - odd-number range filter and user management over REST
#[derive(Parser)]
#[command(name = "parity-server")]
#[command(about = "Parity Server - odd-number range filter and user management over REST")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(path) = cli.config.as_deref()
        && !path.is_file()
    {
        anyhow::bail!("config file does not exist: {}", path.display());
    }

    // defaults -> YAML -> env (PARITY__*) -> CLI overrides
    let mut config =
        AppConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    config.apply_cli_overrides(&CliOverrides {
        port: cli.port,
        mock: cli.mock,
        verbose: cli.verbose,
    });
    config.validate().context("invalid configuration")?;

    init_logging(&config.logging);

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(&config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}

async fn run_server(config: &AppConfig) -> Result<()> {
    tracing::info!(
        environment = ?config.environment,
        bind_addr = %config.server.bind_addr,
        dsn = %redact_dsn(&config.database.dsn),
        "Parity Server starting"
    );
    parity::server::run(config).await
}
