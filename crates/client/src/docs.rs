//! Wire shapes of the ERPNext documents the client reads and writes.
//!
//! These mirror what `/api/resource` returns, field for field. Required
//! fields are plain types so a response missing them fails to decode;
//! everything ERPNext may leave empty is an `Option`. Conversion into the
//! public types lives in [`crate::conversions`].

use chrono::{NaiveDate, NaiveDateTime};
use erp_storefront_core::{InvoiceStatus, SalesOrderStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::scalars;

// =============================================================================
// Doctype Names
// =============================================================================

pub const WEBSITE_ITEM: &str = "Website Item";
pub const ITEM: &str = "Item";
pub const ITEM_DEFAULT: &str = "Item Default";
pub const ITEM_PRICE: &str = "Item Price";
pub const ITEM_GROUP: &str = "Item Group";
pub const BIN: &str = "Bin";
pub const PRICING_RULE: &str = "Pricing Rule";
pub const WISHLIST: &str = "Wishlist";
pub const USER: &str = "User";
pub const CUSTOMER: &str = "Customer";
pub const SALES_ORDER: &str = "Sales Order";
pub const SALES_INVOICE: &str = "Sales Invoice";
pub const ADDRESS: &str = "Address";
pub const DYNAMIC_LINK: &str = "Dynamic Link";

// =============================================================================
// Field Lists
// =============================================================================

pub const WEBSITE_ITEM_FIELDS: &[&str] = &[
    "name",
    "web_item_name",
    "item_name",
    "item_code",
    "item_group",
    "website_image",
    "thumbnail",
    "published",
    "ranking",
    "creation",
    "website_warehouse",
    "route",
    "short_description",
];

pub const ITEM_PRICE_FIELDS: &[&str] = &[
    "name",
    "item_code",
    "price_list",
    "price_list_rate",
];

pub const BIN_FIELDS: &[&str] = &["item_code", "warehouse", "actual_qty", "reserved_qty"];

pub const ITEM_GROUP_FIELDS: &[&str] = &[
    "name",
    "item_group_name",
    "parent_item_group",
    "is_group",
    "image",
];

pub const PRICING_RULE_FIELDS: &[&str] = &[
    "name",
    "title",
    "disable",
    "rate_or_discount",
    "discount_percentage",
    "discount_amount",
    "rate",
    "valid_from",
    "valid_upto",
];

pub const SALES_ORDER_FIELDS: &[&str] = &[
    "name",
    "customer",
    "transaction_date",
    "delivery_date",
    "status",
    "currency",
    "grand_total",
];

pub const SALES_INVOICE_FIELDS: &[&str] = &[
    "name",
    "customer",
    "posting_date",
    "due_date",
    "status",
    "currency",
    "grand_total",
    "outstanding_amount",
];

pub const ADDRESS_FIELDS: &[&str] = &[
    "name",
    "address_title",
    "address_type",
    "address_line1",
    "address_line2",
    "city",
    "state",
    "pincode",
    "country",
    "phone",
    "email_id",
    "is_primary_address",
    "is_shipping_address",
];

// =============================================================================
// Catalog
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct WebsiteItemDoc {
    pub name: String,
    pub item_code: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub web_item_name: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub item_name: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub item_group: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub website_image: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub thumbnail: Option<String>,
    #[serde(deserialize_with = "scalars::check")]
    pub published: bool,
    #[serde(default)]
    pub ranking: Option<i64>,
    #[serde(default, deserialize_with = "scalars::opt_datetime")]
    pub creation: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub website_warehouse: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub route: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemCodeDoc {
    pub item_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemPriceDoc {
    pub item_code: String,
    pub price_list: String,
    #[serde(default)]
    pub price_list_rate: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BinDoc {
    pub item_code: String,
    pub warehouse: String,
    #[serde(default, deserialize_with = "scalars::float")]
    pub actual_qty: f64,
    #[serde(default, deserialize_with = "scalars::float")]
    pub reserved_qty: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemGroupDoc {
    pub name: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub item_group_name: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub parent_item_group: Option<String>,
    #[serde(default, deserialize_with = "scalars::check")]
    pub is_group: bool,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub image: Option<String>,
}

// =============================================================================
// Pricing Rules
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct PricingRuleDoc {
    pub name: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalars::check")]
    pub disable: bool,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub rate_or_discount: Option<String>,
    #[serde(default)]
    pub discount_percentage: Option<Decimal>,
    #[serde(default)]
    pub discount_amount: Option<Decimal>,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default, deserialize_with = "scalars::opt_date")]
    pub valid_from: Option<NaiveDate>,
    #[serde(default, deserialize_with = "scalars::opt_date")]
    pub valid_upto: Option<NaiveDate>,
    /// Only present on full documents.
    #[serde(default)]
    pub items: Vec<PricingRuleItemDoc>,
    /// Only present on full documents.
    #[serde(default)]
    pub item_groups: Vec<PricingRuleItemGroupDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingRuleItemDoc {
    pub item_code: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PricingRuleItemGroupDoc {
    pub item_group: String,
}

// =============================================================================
// Wishlist
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WishlistDoc {
    pub name: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub user: Option<String>,
    #[serde(default)]
    pub items: Vec<WishlistItemDoc>,
}

/// Child row of `Wishlist.items`. Also the shape written back on update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItemDoc {
    /// Row name; kept so ERPNext updates the row instead of recreating it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub item_code: String,
    #[serde(default = "default_qty", deserialize_with = "scalars::count")]
    pub qty: u32,
    #[serde(
        default,
        deserialize_with = "scalars::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalars::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub website_item: Option<String>,
    #[serde(
        default,
        deserialize_with = "scalars::opt_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub item_name: Option<String>,
}

const fn default_qty() -> u32 {
    1
}

// =============================================================================
// Users & Customers
// =============================================================================

/// Any document when only its name was requested.
#[derive(Debug, Clone, Deserialize)]
pub struct NamedDoc {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserDoc {
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub full_name: Option<String>,
}

// =============================================================================
// Sales
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct SalesOrderDoc {
    pub name: String,
    pub customer: String,
    #[serde(default, deserialize_with = "scalars::opt_date")]
    pub transaction_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "scalars::opt_date")]
    pub delivery_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: SalesOrderStatus,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub currency: Option<String>,
    #[serde(default)]
    pub grand_total: Option<Decimal>,
    /// Child table; absent from list responses.
    #[serde(default)]
    pub items: Vec<SalesOrderItemDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesOrderItemDoc {
    pub item_code: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub item_name: Option<String>,
    #[serde(default, deserialize_with = "scalars::float")]
    pub qty: f64,
    #[serde(default)]
    pub rate: Option<Decimal>,
    #[serde(default)]
    pub amount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SalesInvoiceDoc {
    pub name: String,
    pub customer: String,
    #[serde(default, deserialize_with = "scalars::opt_date")]
    pub posting_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "scalars::opt_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: InvoiceStatus,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub currency: Option<String>,
    #[serde(default)]
    pub grand_total: Option<Decimal>,
    #[serde(default)]
    pub outstanding_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressDoc {
    pub name: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub address_title: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub address_type: Option<String>,
    pub address_line1: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub address_line2: Option<String>,
    pub city: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub pincode: Option<String>,
    pub country: String,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "scalars::opt_text")]
    pub email_id: Option<String>,
    #[serde(default, deserialize_with = "scalars::check")]
    pub is_primary_address: bool,
    #[serde(default, deserialize_with = "scalars::check")]
    pub is_shipping_address: bool,
}
