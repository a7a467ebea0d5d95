//! Wishlist read-modify-write on the session transport.
//!
//! One `Wishlist` document per user, named after the user, with the saved
//! items in its `items` child table. Updates replace the whole table and
//! are not guarded against concurrent writers: two devices editing at once
//! means the last write wins.

use erp_storefront_core::ItemCode;
use serde_json::json;
use tracing::{debug, instrument};

use super::SessionClient;
use crate::conversions::convert_wishlist;
use crate::docs::{WISHLIST, WishlistDoc, WishlistItemDoc};
use crate::error::{Result, none_if_missing};
use crate::types::Wishlist;

impl SessionClient {
    /// The user's wishlist; `None` if they never saved anything.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than a missing wishlist.
    #[instrument(skip(self))]
    pub async fn get_wishlist(&self, user: &str) -> Result<Option<Wishlist>> {
        Ok(self.wishlist_doc(user).await?.map(convert_wishlist))
    }

    /// Save an item, creating the wishlist on first use.
    ///
    /// An item already on the list has its quantity (and notes, when given)
    /// updated in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be read, created or written.
    #[instrument(skip(self, notes), fields(item_code = %item_code))]
    pub async fn add_item(
        &self,
        user: &str,
        item_code: &ItemCode,
        qty: u32,
        notes: Option<&str>,
    ) -> Result<Wishlist> {
        let mut doc = match self.wishlist_doc(user).await? {
            Some(doc) => doc,
            None => {
                debug!("Creating wishlist");
                self.transport()
                    .insert::<WishlistDoc, _>(WISHLIST, &json!({"user": user, "items": []}))
                    .await?
            }
        };

        upsert_line(&mut doc.items, item_code, qty, notes);
        self.write_items(&doc.name, &doc.items).await
    }

    /// Remove an item. Removing an item that is not saved is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be read or written.
    #[instrument(skip(self), fields(item_code = %item_code))]
    pub async fn remove_item(&self, user: &str, item_code: &ItemCode) -> Result<Option<Wishlist>> {
        let Some(mut doc) = self.wishlist_doc(user).await? else {
            return Ok(None);
        };

        if !remove_line(&mut doc.items, item_code) {
            debug!("Item not on wishlist, nothing to remove");
            return Ok(Some(convert_wishlist(doc)));
        }

        self.write_items(&doc.name, &doc.items).await.map(Some)
    }

    /// Remove every item. The (empty) wishlist document stays.
    ///
    /// # Errors
    ///
    /// Returns an error if the wishlist cannot be read or written.
    #[instrument(skip(self))]
    pub async fn clear(&self, user: &str) -> Result<()> {
        match self.wishlist_doc(user).await? {
            Some(doc) if !doc.items.is_empty() => {
                self.write_items(&doc.name, &[]).await?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    async fn wishlist_doc(&self, user: &str) -> Result<Option<WishlistDoc>> {
        none_if_missing(self.transport().get_doc(WISHLIST, user).await)
    }

    async fn write_items(&self, name: &str, items: &[WishlistItemDoc]) -> Result<Wishlist> {
        let doc: WishlistDoc = self
            .transport()
            .update(WISHLIST, name, &json!({"items": items}))
            .await?;
        Ok(convert_wishlist(doc))
    }
}

/// Update the line for `item_code` or append one. Quantity is at least 1.
fn upsert_line(items: &mut Vec<WishlistItemDoc>, item_code: &ItemCode, qty: u32, notes: Option<&str>) {
    let qty = qty.max(1);
    let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(ToString::to_string);

    if let Some(line) = items.iter_mut().find(|l| l.item_code == item_code.as_str()) {
        line.qty = qty;
        if notes.is_some() {
            line.notes = notes;
        }
        return;
    }

    items.push(WishlistItemDoc {
        name: None,
        item_code: item_code.as_str().to_string(),
        qty,
        notes,
        website_item: None,
        item_name: None,
    });
}

/// Drop every line for `item_code`; returns whether anything changed.
fn remove_line(items: &mut Vec<WishlistItemDoc>, item_code: &ItemCode) -> bool {
    let before = items.len();
    items.retain(|l| l.item_code != item_code.as_str());
    items.len() != before
}
