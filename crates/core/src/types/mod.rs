//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod name;
pub mod price;
pub mod status;
pub mod stock;

pub use email::{Email, EmailError, IdentifierError, LoginIdentifier};
pub use name::*;
pub use price::PriceQuote;
pub use status::*;
pub use stock::StockLevel;
