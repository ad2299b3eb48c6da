//! Service layer
//!
//! - `SongStore`: async storage abstraction and its SQLite implementation
//! - `SongCatalog`: listing, verse, detail and mutation operations
//! - `SimpleServices`: wires configuration, storage and the catalog together

pub mod catalog;
pub mod database;
pub mod simple_container;

pub use catalog::SongCatalog;
pub use database::{SongStore, SqliteSongStore};
pub use simple_container::SimpleServices;
