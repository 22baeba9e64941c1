//! CLI command handlers

pub mod alert;
pub mod auth;
pub mod bank;
pub mod consent;
pub mod document;
pub mod logs;
pub mod profile;

use anyhow::Result;
use serde::Serialize;

/// Pretty-print any record as JSON
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
