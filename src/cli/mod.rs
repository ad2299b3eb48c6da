//! Command Line Interface module
//!
//! - `serve`: run the HTTP API
//! - `migrate`: bring the database schema up to date
//! - `config`: inspect configuration

pub mod config;
pub mod migrate;
pub mod serve;
