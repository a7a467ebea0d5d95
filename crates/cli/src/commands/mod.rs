//! Subcommand handlers.
//!
//! - [`catalog`] - catalog, price, stock, categories, pricing rules
//! - [`sales`] - orders, invoices, addresses
//! - [`account`] - login and wishlist

pub mod account;
pub mod catalog;
pub mod sales;

use std::io::Write;

use serde::Serialize;
use thiserror::Error;

/// Errors raised by the CLI itself rather than the client.
#[derive(Debug, Error)]
pub enum CliError {
    /// Failed to render a result.
    #[error("Failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),

    /// Failed to write to stdout.
    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// An argument could not be interpreted.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Print a result as pretty JSON on stdout.
pub fn emit<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

/// Result type for subcommand handlers.
pub type CommandResult = Result<(), Box<dyn std::error::Error>>;
