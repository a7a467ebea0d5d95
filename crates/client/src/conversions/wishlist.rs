//! Wishlist conversions.

use erp_storefront_core::ItemCode;

use crate::docs::{WishlistDoc, WishlistItemDoc};
use crate::types::{Wishlist, WishlistLine};

pub fn convert_wishlist(doc: WishlistDoc) -> Wishlist {
    Wishlist {
        user: doc.user.unwrap_or_else(|| doc.name.clone()),
        name: doc.name,
        lines: doc.items.into_iter().map(convert_wishlist_line).collect(),
    }
}

pub fn convert_wishlist_line(row: WishlistItemDoc) -> WishlistLine {
    WishlistLine {
        item_code: ItemCode::new(row.item_code),
        qty: row.qty,
        notes: row.notes,
        website_item: row.website_item,
        item_name: row.item_name,
    }
}
