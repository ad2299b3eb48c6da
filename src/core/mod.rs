//! Core functionality modules
//!
//! - `models`: song, draft and update types
//! - `filter`: criteria and predicate composition for listings
//! - `verses`: lyric segmentation
//! - `pagination`: offset/limit windows
//! - `dates`: DD.MM.YYYY parsing and formatting
//! - `deadline`: per-operation deadlines
//! - `data`: SQLite persistence

pub mod data;
pub mod dates;
pub mod deadline;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod verses;

pub use data::Database;
