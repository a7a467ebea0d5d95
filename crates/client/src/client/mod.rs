//! Service-level ERPNext client authenticated with the API key.
//!
//! Accessors are split by concern:
//! - [`catalog`] - Website Item listing, detail, search and enrichment
//! - [`price`] - price list fallback resolution
//! - [`stock`] - Bin counters
//! - [`categories`] - Item Group tree and representative images
//! - [`pricing_rules`] - discount rules and the products they apply to
//! - [`sales`] - orders, invoices, addresses, customer lookups

mod catalog;
mod categories;
mod price;
mod pricing_rules;
mod sales;
mod stock;

use std::sync::Arc;

pub use catalog::DEFAULT_SEARCH_LIMIT;
pub use categories::{
    REPRESENTATIVE_BATCH, children_of, descendants_of, pick_representative_image,
    root_categories,
};
pub use price::price_list_candidates;

use crate::config::ErpConfig;
use crate::error::Result;
use crate::session::SessionClient;
use crate::transport::Transport;

// =============================================================================
// ErpClient
// =============================================================================

/// Client for one ERPNext site.
///
/// Cheap to clone; clones share the connection pool. Build one at startup
/// with [`ErpClient::new`] and pass it to whatever needs it.
#[derive(Clone)]
pub struct ErpClient {
    inner: Arc<ErpClientInner>,
}

struct ErpClientInner {
    transport: Transport,
    config: ErpConfig,
}

impl ErpClient {
    /// Create a client from a configuration.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::Request` if the HTTP client cannot be built.
    pub fn new(config: ErpConfig) -> Result<Self> {
        let transport = Transport::credential(&config)?;
        Ok(Self {
            inner: Arc::new(ErpClientInner { transport, config }),
        })
    }

    /// Configuration the client was built from.
    #[must_use]
    pub fn config(&self) -> &ErpConfig {
        &self.inner.config
    }

    /// Open a cookie session for login and user-scoped calls.
    ///
    /// Each session has its own connection pool and cookie jar; nothing is
    /// shared with this client's API-key transport.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::Request` if the HTTP client cannot be built.
    pub fn open_session(&self) -> Result<SessionClient> {
        SessionClient::new(self.clone())
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.inner.transport
    }
}

impl std::fmt::Debug for ErpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErpClient")
            .field("base_url", &self.inner.config.base_url.as_str())
            .finish_non_exhaustive()
    }
}
