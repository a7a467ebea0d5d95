//! Conversion from ERPNext wire documents to the public types.

pub mod catalog;
pub mod pricing;
pub mod sales;
pub mod wishlist;

pub use catalog::{convert_item_group, convert_website_item};
pub use pricing::convert_pricing_rule;
pub use sales::{
    convert_address, convert_sales_invoice, convert_sales_order, new_address_body,
    new_sales_order_body,
};
pub use wishlist::convert_wishlist;
