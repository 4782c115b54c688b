//! Command handlers

pub mod export;
pub mod import;
pub mod processors;
pub mod validate;
