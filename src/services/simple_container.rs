use std::sync::Arc;
use crate::config::Config;
use crate::core::Database;
use crate::error::Result;
use crate::services::{SongCatalog, SqliteSongStore};

pub struct SimpleServices {
    config: Arc<Config>,
}

impl SimpleServices {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> Arc<Config> {
        self.config.clone()
    }

    /// Open (and migrate) the configured database.
    pub fn open_database(&self) -> Result<Database> {
        Database::open(&self.config.database_path)
    }

    pub fn create_store(&self) -> Result<SqliteSongStore> {
        Ok(SqliteSongStore::new(self.open_database()?))
    }

    pub fn create_catalog(&self, store: SqliteSongStore) -> SongCatalog {
        SongCatalog::new(Arc::new(store), self.config.query_timeout())
    }
}
