//! Selling price representation using decimal arithmetic.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::name::ItemCode;

/// A selling price resolved from an ERPNext `Item Price` record.
///
/// A quote only exists for a strictly positive rate. ERPNext happily stores
/// zero and negative rates (and price rows without a rate at all); those
/// mean "no price" for the storefront, never "free".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Item the price belongs to.
    pub item_code: ItemCode,
    /// Price list the rate was found in.
    pub price_list: String,
    /// Rate in the price list's currency.
    pub rate: Decimal,
}

impl PriceQuote {
    /// Build a quote if the rate is usable.
    ///
    /// Returns `None` for missing, zero or negative rates.
    #[must_use]
    pub fn accept(
        item_code: ItemCode,
        price_list: impl Into<String>,
        rate: Option<Decimal>,
    ) -> Option<Self> {
        let rate = rate.filter(|r| r.is_sign_positive() && !r.is_zero())?;
        Some(Self {
            item_code,
            price_list: price_list.into(),
            rate,
        })
    }

    /// Discount amount for a percentage off this rate.
    ///
    /// Non-positive percentages yield zero.
    #[must_use]
    pub fn percentage_off(&self, percentage: Decimal) -> Decimal {
        if percentage <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        (self.rate * percentage / Decimal::ONE_HUNDRED).round_dp(2)
    }
}
