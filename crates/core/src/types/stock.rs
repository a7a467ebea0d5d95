//! Warehouse stock counters.

use serde::{Deserialize, Serialize};

use super::name::ItemCode;

/// Stock counters of one ERPNext `Bin` (item x warehouse).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Item the counters belong to.
    pub item_code: ItemCode,
    /// Warehouse holding the stock.
    pub warehouse: String,
    /// Physical quantity on hand.
    pub actual_qty: f64,
    /// Quantity reserved by open sales orders.
    pub reserved_qty: f64,
}

impl StockLevel {
    /// Quantity that can still be sold from this bin.
    ///
    /// Never negative: over-reservation reads as zero.
    #[must_use]
    pub fn available(&self) -> f64 {
        (self.actual_qty - self.reserved_qty).max(0.0)
    }

    /// Sum of sellable quantity over several bins.
    ///
    /// Each bin is clamped on its own before summing, so one over-reserved
    /// bin cannot eat into another bin's stock.
    pub fn total_available<'a>(levels: impl IntoIterator<Item = &'a Self>) -> f64 {
        levels.into_iter().map(Self::available).sum()
    }
}
