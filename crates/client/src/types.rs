//! View-ready types returned by the client.
//!
//! These are what callers render. They are assembled from one or more
//! ERPNext documents and carry no wire-format quirks (no `0`/`1` flags, no
//! blank strings standing in for "unset").

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime};
use erp_storefront_core::{CustomerId, InvoiceStatus, ItemCode, PriceQuote, SalesOrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A published product listing enriched with price and stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Website Item name (primary key).
    pub id: String,
    /// Name shown to customers.
    pub display_name: String,
    pub item_code: ItemCode,
    pub item_group: Option<String>,
    /// Main product image.
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub published: bool,
    pub ranking: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
    /// Warehouse stock is counted in.
    pub warehouse: Option<String>,
    pub route: Option<String>,
    pub description: Option<String>,
    /// Resolved selling price; `None` when no positive rate exists or the
    /// lookup failed.
    pub price: Option<PriceQuote>,
    /// Sellable quantity in `warehouse`; 0 when unknown.
    pub available_stock: f64,
    /// Discount attached by pricing rule resolution.
    pub discount: Option<AppliedDiscount>,
}

impl CatalogEntry {
    /// Image to show in listings: the main image, else the thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.image.as_deref().or(self.thumbnail.as_deref())
    }

    /// Whether a price was resolved.
    #[must_use]
    pub const fn has_price(&self) -> bool {
        self.price.is_some()
    }

    /// Listing order: ranking descending, then newest first.
    ///
    /// An unset ranking counts as 0, which is what ERPNext stores for items
    /// nobody ranked.
    #[must_use]
    pub fn listing_order(&self, other: &Self) -> Ordering {
        let key = |e: &Self| (e.ranking.unwrap_or(0), e.created_at);
        key(other).cmp(&key(self))
    }
}

/// Sort entries into listing order.
pub fn sort_for_listing(entries: &mut [CatalogEntry]) {
    entries.sort_by(CatalogEntry::listing_order);
}

/// A pricing rule discount applied to one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDiscount {
    /// Pricing Rule name.
    pub rule: String,
    /// Percentage off, for percentage rules.
    pub percentage: Option<Decimal>,
    /// Amount off the entry's price.
    pub amount: Decimal,
}

// =============================================================================
// Categories
// =============================================================================

/// A node of the Item Group tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryNode {
    pub name: String,
    pub display_name: String,
    /// Parent group; `None` for roots.
    pub parent: Option<String>,
    /// Whether the node can have children.
    pub is_group: bool,
    /// Group image, or a representative product image.
    pub image: Option<String>,
}

impl CategoryNode {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent.is_none()
    }
}

// =============================================================================
// Pricing Rules
// =============================================================================

/// How a pricing rule changes the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DiscountKind {
    /// Percentage off the price.
    Percentage(Decimal),
    /// Fixed amount off the price.
    Amount(Decimal),
    /// Fixed selling rate replacing the price.
    Rate(Decimal),
}

/// A selling discount policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingRule {
    pub name: String,
    pub title: Option<String>,
    pub enabled: bool,
    pub discount: DiscountKind,
    pub valid_from: Option<NaiveDate>,
    pub valid_upto: Option<NaiveDate>,
    /// Item codes the rule applies to.
    pub item_codes: Vec<ItemCode>,
    /// Item groups the rule applies to.
    pub item_groups: Vec<String>,
}

impl PricingRule {
    /// Whether the rule is enabled and `date` is inside its validity window.
    ///
    /// Open ends of the window are unbounded.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.enabled
            && self.valid_from.is_none_or(|from| from <= date)
            && self.valid_upto.is_none_or(|upto| date <= upto)
    }

    /// Amount this rule takes off `price`.
    ///
    /// Without a price there is nothing to discount, so the result is 0.
    /// The result never exceeds the price and is never negative.
    #[must_use]
    pub fn discount_for(&self, price: Option<&PriceQuote>) -> Decimal {
        let Some(price) = price else {
            return Decimal::ZERO;
        };
        let amount = match self.discount {
            DiscountKind::Percentage(pct) => price.percentage_off(pct),
            DiscountKind::Amount(amount) => amount,
            DiscountKind::Rate(rate) => price.rate - rate,
        };
        amount.clamp(Decimal::ZERO, price.rate)
    }

    /// Discount record for an entry, if the rule takes anything off.
    #[must_use]
    pub fn apply_to(&self, entry: &CatalogEntry) -> Option<AppliedDiscount> {
        let amount = self.discount_for(entry.price.as_ref());
        (amount > Decimal::ZERO).then(|| AppliedDiscount {
            rule: self.name.clone(),
            percentage: match self.discount {
                DiscountKind::Percentage(pct) => Some(pct),
                DiscountKind::Amount(_) | DiscountKind::Rate(_) => None,
            },
            amount,
        })
    }
}

// =============================================================================
// Wishlist
// =============================================================================

/// A user's saved items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    /// Document name (the user id).
    pub name: String,
    pub user: String,
    pub lines: Vec<WishlistLine>,
}

impl Wishlist {
    /// Line for `item_code`, if saved.
    #[must_use]
    pub fn line(&self, item_code: &ItemCode) -> Option<&WishlistLine> {
        self.lines.iter().find(|l| &l.item_code == item_code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One saved item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishlistLine {
    pub item_code: ItemCode,
    pub qty: u32,
    pub notes: Option<String>,
    pub website_item: Option<String>,
    pub item_name: Option<String>,
}

// =============================================================================
// Session
// =============================================================================

/// Identity established by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    /// ERPNext user id (the email address).
    pub user: String,
    /// Full name, when the identity lookup succeeded.
    pub display_name: Option<String>,
    /// Customer linked to the user's email, when one was found.
    pub customer: Option<CustomerId>,
}

// =============================================================================
// Sales Documents
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesOrder {
    pub id: String,
    pub customer: CustomerId,
    pub transaction_date: Option<NaiveDate>,
    pub delivery_date: Option<NaiveDate>,
    pub status: SalesOrderStatus,
    pub currency: Option<String>,
    pub grand_total: Decimal,
    /// Empty in list results; ERPNext only returns child rows on full
    /// documents.
    pub lines: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_code: ItemCode,
    pub item_name: Option<String>,
    pub qty: f64,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Cart checkout payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSalesOrder {
    pub customer: CustomerId,
    /// Selling company; the configured default is used when `None`.
    pub company: Option<String>,
    pub delivery_date: NaiveDate,
    pub lines: Vec<NewOrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderLine {
    pub item_code: ItemCode,
    pub qty: f64,
    /// Rate override; ERPNext prices the line from the price list when
    /// `None`.
    pub rate: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesInvoice {
    pub id: String,
    pub customer: CustomerId,
    pub posting_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub status: InvoiceStatus,
    pub currency: Option<String>,
    pub grand_total: Decimal,
    pub outstanding_amount: Decimal,
}

// =============================================================================
// Addresses
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: String,
    pub title: Option<String>,
    /// `Billing`, `Shipping`, ...
    pub address_type: Option<String>,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_primary: bool,
    pub is_shipping: bool,
}

/// Address to create for a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub title: String,
    pub address_type: String,
    pub line1: String,
    pub line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_shipping: bool,
}
