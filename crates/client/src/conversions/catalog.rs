//! Catalog and category conversions.

use erp_storefront_core::ItemCode;

use crate::docs::{ItemGroupDoc, WebsiteItemDoc};
use crate::types::{CatalogEntry, CategoryNode};

/// Convert a Website Item. Price and stock start out unresolved.
pub fn convert_website_item(doc: WebsiteItemDoc) -> CatalogEntry {
    let display_name = doc
        .web_item_name
        .or_else(|| doc.item_name.clone())
        .unwrap_or_else(|| doc.item_code.clone());

    CatalogEntry {
        id: doc.name,
        display_name,
        item_code: ItemCode::new(doc.item_code),
        item_group: doc.item_group,
        image: doc.website_image,
        thumbnail: doc.thumbnail,
        published: doc.published,
        ranking: doc.ranking,
        created_at: doc.creation,
        warehouse: doc.website_warehouse,
        route: doc.route,
        description: doc.short_description,
        price: None,
        available_stock: 0.0,
        discount: None,
    }
}

pub fn convert_item_group(doc: ItemGroupDoc) -> CategoryNode {
    CategoryNode {
        display_name: doc.item_group_name.unwrap_or_else(|| doc.name.clone()),
        name: doc.name,
        parent: doc.parent_item_group,
        is_group: doc.is_group,
        image: doc.image,
    }
}
