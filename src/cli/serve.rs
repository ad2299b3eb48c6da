use clap::Args;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::{self, AppState};
use crate::config::validation::ConfigValidator;
use crate::error::{ConfigError, Result};
use crate::services::SimpleServices;
use crate::signal_handler::shutdown_signal;

#[derive(Args)]
pub struct ServeArgs {
    /// Listen address, overriding the configured host (e.g. 0.0.0.0:8080)
    #[arg(long, value_name = "ADDR")]
    host: Option<String>,
}

pub async fn execute(args: ServeArgs, services: &SimpleServices) -> Result<()> {
    let config = services.config();
    let host = match args.host {
        Some(host) => {
            ConfigValidator::validate_listen_addr(&host)?;
            host
        }
        None => config.host.clone(),
    };

    let store = services.create_store()?;
    let catalog = services.create_catalog(store.clone());
    let app = api::router(AppState::new(catalog), config.max_body_bytes);

    let listener = TcpListener::bind(&host).await.map_err(|e| {
        error!(address = %host, error = %e, "Failed to bind listener");
        ConfigError::InvalidValue {
            field: "host".to_string(),
            value: format!("{} ({})", host, e),
        }
    })?;
    info!(
        address = %host,
        database = %config.database_path.display(),
        "Song catalog listening"
    );

    api::serve(listener, app, shutdown_signal()).await?;

    info!("Server stopped, closing database");
    store.close()?;
    Ok(())
}
