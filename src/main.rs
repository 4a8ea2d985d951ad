use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info};

mod cli;

use cli::output::{LogFormat, OutputFormat};
use cli::runtime::init_logging;
use cli::{cmd_plan, cmd_validate, ManifestArgs};

/// Routebind - bind HTTP API routes to Lambda proxy integrations
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level
    #[arg(short, long, default_value = "warn")]
    log_level: String,

    /// Enable debug mode
    #[arg(short, long)]
    debug: bool,

    /// Log line format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Output format
    #[arg(short, long, value_enum, default_value = "human")]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bind every route in a manifest and print the integrations and grants
    Plan(ManifestArgs),
    /// Check a manifest without binding any route
    Validate(ManifestArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_format)?;
    info!("Starting routebind v{}", env!("CARGO_PKG_VERSION"));

    let result = match cli.command {
        Commands::Plan(args) => cmd_plan(args, &cli.output).await,
        Commands::Validate(args) => cmd_validate(args).await,
    };

    match result {
        Ok(()) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {:#}", e);
            eprintln!("error: {:#}", e);
            std::process::exit(1);
        }
    }
}
