//! ERP Storefront Core - Shared types library.
//!
//! This crate provides common types used across the storefront workspace:
//! - `client` - ERPNext integration client
//! - `cli` - Command-line driver for the client
//!
//! # Architecture
//!
//! The core crate contains only types and arithmetic - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Document names, login identifiers, prices, stock levels
//!   and document statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
