//! Price resolution across price lists.

use erp_storefront_core::{ItemCode, PriceQuote};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use super::ErpClient;
use crate::docs::{ITEM_PRICE, ITEM_PRICE_FIELDS, ItemPriceDoc};
use crate::error::Result;
use crate::query::{Filter, ListQuery};

/// Rows inspected per price list; the first positive rate wins.
const PRICE_ROWS: u32 = 5;

/// Rows inspected by the final query over all price lists.
const UNSCOPED_PRICE_ROWS: u32 = 20;

/// Price lists to try, in order, without duplicates.
///
/// An explicit list is the only candidate. Otherwise the configured default
/// comes first and the fallback after it.
#[must_use]
pub fn price_list_candidates(
    explicit: Option<&str>,
    default: Option<&str>,
    fallback: &str,
) -> Vec<String> {
    if let Some(explicit) = explicit {
        return vec![explicit.to_string()];
    }

    let mut candidates: Vec<String> = default.into_iter().map(ToString::to_string).collect();
    if !candidates.iter().any(|c| c == fallback) {
        candidates.push(fallback.to_string());
    }
    candidates
}

impl ErpClient {
    /// Selling rate of an item; `0` means no price was found.
    ///
    /// Never fails: lookup errors are logged and count as "no price".
    #[instrument(skip(self), fields(item_code = %item_code))]
    pub async fn resolve_price(&self, item_code: &ItemCode, price_list: Option<&str>) -> Decimal {
        match self.price_quote(item_code, price_list).await {
            Ok(quote) => quote.map_or(Decimal::ZERO, |quote| quote.rate),
            Err(e) => {
                warn!(error = %e, "Price lookup failed, treating as unpriced");
                Decimal::ZERO
            }
        }
    }

    /// Like [`Self::resolve_price`], but says which list the rate came from.
    ///
    /// A failing price list is skipped and the next one is tried.
    ///
    /// # Errors
    ///
    /// Returns the last error when every lookup failed, so callers can tell
    /// an unpriced item from an unreachable server.
    pub async fn price_quote(
        &self,
        item_code: &ItemCode,
        price_list: Option<&str>,
    ) -> Result<Option<PriceQuote>> {
        let config = self.config();
        let candidates = price_list_candidates(
            price_list,
            config.default_price_list.as_deref(),
            &config.fallback_price_list,
        );

        let mut answered = false;
        for candidate in &candidates {
            match self.quote_from(item_code, Some(candidate)).await {
                Ok(Some(quote)) => return Ok(Some(quote)),
                Ok(None) => {
                    answered = true;
                    debug!(price_list = %candidate, "No usable rate in price list");
                }
                Err(e) => {
                    warn!(price_list = %candidate, error = %e, "Price list lookup failed, trying next");
                }
            }
        }

        match self.quote_from(item_code, None).await {
            Err(e) if answered => {
                warn!(error = %e, "Unscoped price lookup failed");
                Ok(None)
            }
            other => other,
        }
    }

    /// First positive rate for the item, in one price list or in any.
    async fn quote_from(
        &self,
        item_code: &ItemCode,
        price_list: Option<&str>,
    ) -> Result<Option<PriceQuote>> {
        let mut query = ListQuery::new()
            .fields(ITEM_PRICE_FIELDS)
            .filter(Filter::eq("item_code", item_code.as_str()))
            .filter(Filter::eq("selling", 1))
            .order_by("modified desc");
        query = match price_list {
            Some(list) => query.filter(Filter::eq("price_list", list)).limit(PRICE_ROWS),
            None => query.limit(UNSCOPED_PRICE_ROWS),
        };

        let rows: Vec<ItemPriceDoc> = self.transport().list(ITEM_PRICE, &query).await?;

        Ok(rows.into_iter().find_map(|row| {
            PriceQuote::accept(
                ItemCode::new(row.item_code),
                row.price_list,
                row.price_list_rate,
            )
        }))
    }
}
