//! Data layer modules
//!
//! SQLite persistence for the song catalog.

pub mod database;

pub use database::Database;
