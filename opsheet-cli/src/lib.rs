//! Bulk TSV export and import of processor operations

pub mod cli;
pub mod config;
pub mod import;
