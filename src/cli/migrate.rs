use clap::Args;
use tracing::info;

use crate::error::Result;
use crate::services::SimpleServices;

#[derive(Args)]
pub struct MigrateArgs {}

pub async fn execute(_args: MigrateArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    let db = services.open_database()?;
    let version = db.schema_version()?;
    db.close()?;

    info!(version, "Database schema is up to date");
    println!("🗄️  Database: {}", config.database_path.display());
    println!("📐 Schema version: {}", version);
    Ok(())
}
