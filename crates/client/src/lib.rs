//! ERP Storefront Client - ERPNext integration for the marketplace storefront.
//!
//! Talks to a Frappe/ERPNext site over its REST API and turns the raw
//! documents into storefront types: catalog entries with price and stock
//! attached, the category tree, pricing rules, wishlists and the sales
//! documents a customer can see.
//!
//! # Clients
//!
//! - [`ErpClient`] - service-level calls authenticated with the site's API
//!   key and secret
//! - [`SessionClient`] - login and user-scoped calls on a cookie session,
//!   opened with [`ErpClient::open_session`]
//!
//! # Example
//!
//! ```rust,ignore
//! use erp_storefront_client::{ErpClient, ErpConfig};
//!
//! let client = ErpClient::new(ErpConfig::from_env()?)?;
//! let page = client.list_catalog(&[], 24, 0).await?;
//! for entry in &page {
//!     println!("{} {:?}", entry.display_name, entry.price);
//! }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
mod conversions;
mod docs;
pub mod error;
pub mod query;
pub mod retry;
mod scalars;
pub mod session;
mod transport;
pub mod types;

pub use client::{
    DEFAULT_SEARCH_LIMIT, ErpClient, REPRESENTATIVE_BATCH, children_of, descendants_of,
    pick_representative_image, price_list_candidates, root_categories,
};
pub use config::{ConfigError, ErpConfig};
pub use error::{AuthFailure, ErpError, Result, classify_auth_failure};
pub use query::{Filter, ListQuery, Operator, UNLIMITED};
pub use retry::RetryPolicy;
pub use session::SessionClient;
pub use types::*;

pub use erp_storefront_core::{
    CustomerId, Email, InvoiceStatus, ItemCode, LoginIdentifier, PriceQuote, SalesOrderStatus,
    StockLevel,
};
