use clap::{Parser, Subcommand};

mod api;
mod cli;
mod config;
mod core;
mod error;
mod services;
mod signal_handler;
mod utils;

use config::Config;
use error::Result;
use services::SimpleServices;

#[derive(Parser)]
#[command(name = "songcat")]
#[command(about = "HTTP service for a searchable catalog of songs and their lyrics")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the song catalog over HTTP
    Serve(cli::serve::ServeArgs),

    /// Create or upgrade the database schema
    Migrate(cli::migrate::MigrateArgs),

    /// Show configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::init_logging(cli.verbose).map_err(error::SongCatalogError::Internal)?;

    let config = Config::load(cli.config.as_deref())?;
    let services = SimpleServices::new(config);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, &services).await,
        Commands::Migrate(args) => cli::migrate::execute(args, &services).await,
        Commands::Config(args) => cli::config::execute(args, &services.config()).await,
    }
}
