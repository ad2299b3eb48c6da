use clap::{Args, Subcommand};

use crate::config::env::EnvParser;
use crate::config::Config as AppConfig;
use crate::error::Result;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// List all available configuration keys
    Keys,
}

pub async fn execute(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            println!("🔧 Current configuration:");
            println!("  📁 database_path: {}", config.database_path.display());
            println!("  🌐 host: {}", config.host);
            println!("  ⏱️  query_timeout_seconds: {}", config.query_timeout_seconds);
            println!("  📦 max_body_bytes: {}", config.max_body_bytes);

            let env_vars = EnvParser::get_all_songcat_vars();
            if !env_vars.is_empty() {
                println!("\n🌍 Environment overrides:");
                for (key, value) in env_vars {
                    println!("  {} = {}", key, value);
                }
            }
        }

        ConfigCommands::Path => {
            let config_path = AppConfig::config_path()?;
            println!("{}", config_path.display());
        }

        ConfigCommands::Keys => {
            println!("📋 Available configuration keys:");
            println!();
            println!("  database_path          - SQLite database file (.db, .sqlite, .sqlite3)");
            println!("  host                   - Listen address, host:port");
            println!("  query_timeout_seconds  - Deadline for each storage operation (1-300)");
            println!("  max_body_bytes         - Largest accepted request body (1024-67108864)");
            println!();
            println!("🌍 Environment variables (override the config file):");
            println!("  SONGCAT_DATABASE_PATH, SONGCAT_HOST (or HOST),");
            println!("  SONGCAT_QUERY_TIMEOUT_SECONDS, SONGCAT_MAX_BODY_BYTES, DOCKER");
        }
    }

    Ok(())
}
