//! Item Group hierarchy.
//!
//! The tree is fetched once as a flat list and navigated with pure
//! functions, so deeper traversal needs no extra requests.

use std::collections::{HashSet, VecDeque};

use futures::future::join_all;
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::{debug, instrument, warn};

use super::ErpClient;
use crate::conversions::{convert_item_group, convert_website_item};
use crate::docs::{
    ITEM_GROUP, ITEM_GROUP_FIELDS, ItemGroupDoc, WEBSITE_ITEM, WEBSITE_ITEM_FIELDS, WebsiteItemDoc,
};
use crate::error::Result;
use crate::query::{Filter, ListQuery, UNLIMITED};
use crate::types::{CatalogEntry, CategoryNode};

/// Catalog entries inspected when picking a category image.
pub const REPRESENTATIVE_BATCH: u32 = 20;

/// Nodes without a parent.
#[must_use]
pub fn root_categories(nodes: &[CategoryNode]) -> Vec<CategoryNode> {
    nodes.iter().filter(|n| n.is_root()).cloned().collect()
}

/// Direct children of `parent` (exact name match).
#[must_use]
pub fn children_of(nodes: &[CategoryNode], parent: &str) -> Vec<CategoryNode> {
    nodes
        .iter()
        .filter(|n| n.parent.as_deref() == Some(parent))
        .cloned()
        .collect()
}

/// Every node below `parent`, breadth first.
///
/// Cycles in malformed data are cut: each node is visited once.
#[must_use]
pub fn descendants_of(nodes: &[CategoryNode], parent: &str) -> Vec<CategoryNode> {
    let mut seen: HashSet<&str> = HashSet::from([parent]);
    let mut queue: VecDeque<&str> = VecDeque::from([parent]);
    let mut found = Vec::new();

    while let Some(current) = queue.pop_front() {
        for node in nodes.iter().filter(|n| n.parent.as_deref() == Some(current)) {
            if seen.insert(node.name.as_str()) {
                queue.push_back(node.name.as_str());
                found.push(node.clone());
            }
        }
    }

    found
}

/// Pick an image to represent a category.
///
/// Uniformly random among entries with a main image; otherwise the first
/// entry's thumbnail; otherwise nothing.
pub fn pick_representative_image<R: Rng + ?Sized>(
    entries: &[CatalogEntry],
    rng: &mut R,
) -> Option<String> {
    let with_images: Vec<&str> = entries.iter().filter_map(|e| e.image.as_deref()).collect();
    if let Some(image) = with_images.choose(rng) {
        return Some((*image).to_string());
    }
    entries.first().and_then(|e| e.thumbnail.clone())
}

impl ErpClient {
    /// The whole Item Group tree as a flat list.
    ///
    /// # Errors
    ///
    /// Returns an error if the Item Group list cannot be fetched.
    pub async fn list_categories(&self) -> Result<Vec<CategoryNode>> {
        let query = ListQuery::new()
            .fields(ITEM_GROUP_FIELDS)
            .order_by("name asc")
            .limit(UNLIMITED);

        let docs: Vec<ItemGroupDoc> = self.transport().list(ITEM_GROUP, &query).await?;
        Ok(docs.into_iter().map(convert_item_group).collect())
    }

    /// Top-level categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the Item Group list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list_root_categories(&self) -> Result<Vec<CategoryNode>> {
        Ok(root_categories(&self.list_categories().await?))
    }

    /// Direct children of `parent`, each with a representative image.
    ///
    /// Images are picked concurrently and best-effort: a failed pick keeps
    /// the group's own image, if it has one.
    ///
    /// # Errors
    ///
    /// Returns an error if the Item Group list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list_children(&self, parent: &str) -> Result<Vec<CategoryNode>> {
        let children = children_of(&self.list_categories().await?, parent);
        debug!(count = children.len(), "Resolved child categories");

        let tasks = children.into_iter().map(|mut child| async move {
            if let Some(image) = self.representative_image(&child.name).await {
                child.image = Some(image);
            }
            child
        });

        Ok(join_all(tasks).await)
    }

    async fn representative_image(&self, item_group: &str) -> Option<String> {
        let query = ListQuery::new()
            .fields(WEBSITE_ITEM_FIELDS)
            .filter(Filter::eq("published", 1))
            .filter(Filter::eq("item_group", item_group))
            .limit(REPRESENTATIVE_BATCH);

        match self
            .transport()
            .list::<WebsiteItemDoc>(WEBSITE_ITEM, &query)
            .await
        {
            Ok(docs) => {
                let entries: Vec<CatalogEntry> =
                    docs.into_iter().map(convert_website_item).collect();
                pick_representative_image(&entries, &mut rand::rng())
            }
            Err(e) => {
                warn!(item_group, error = %e, "Could not load products for category image");
                None
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use erp_storefront_core::ItemCode;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn node(name: &str, parent: Option<&str>) -> CategoryNode {
        CategoryNode {
            name: name.to_string(),
            display_name: name.to_string(),
            parent: parent.map(ToString::to_string),
            is_group: true,
            image: None,
        }
    }

    fn entry(image: Option<&str>, thumbnail: Option<&str>) -> CatalogEntry {
        CatalogEntry {
            id: "WEB-1".to_string(),
            display_name: "Kettle".to_string(),
            item_code: ItemCode::new("KETTLE-1"),
            item_group: Some("Kitchen".to_string()),
            image: image.map(ToString::to_string),
            thumbnail: thumbnail.map(ToString::to_string),
            published: true,
            ranking: None,
            created_at: None,
            warehouse: None,
            route: None,
            description: None,
            price: None,
            available_stock: 0.0,
            discount: None,
        }
    }

    fn names(nodes: &[CategoryNode]) -> Vec<&str> {
        let mut names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn test_roots_and_children() {
        let nodes = [node("A", None), node("B", Some("A")), node("C", Some("A"))];
        assert_eq!(names(&root_categories(&nodes)), ["A"]);
        assert_eq!(names(&children_of(&nodes, "A")), ["B", "C"]);
        assert!(children_of(&nodes, "B").is_empty());
    }

    #[test]
    fn test_children_need_exact_parent_match() {
        let nodes = [node("A", None), node("b", Some("a")), node("C", Some("A "))];
        assert!(children_of(&nodes, "A").is_empty());
    }

    #[test]
    fn test_descendants_recurse_and_survive_cycles() {
        let nodes = [
            node("A", None),
            node("B", Some("A")),
            node("D", Some("B")),
            node("X", Some("Y")),
            node("Y", Some("X")),
        ];
        assert_eq!(names(&descendants_of(&nodes, "A")), ["B", "D"]);
        assert_eq!(names(&descendants_of(&nodes, "X")), ["Y"]);
    }

    #[test]
    fn test_image_pick_prefers_main_images() {
        let entries = [
            entry(None, Some("/files/t1.jpg")),
            entry(Some("/files/a.jpg"), None),
            entry(Some("/files/b.jpg"), None),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let image = pick_representative_image(&entries, &mut rng).unwrap();
            assert!(image == "/files/a.jpg" || image == "/files/b.jpg");
        }
    }

    #[test]
    fn test_image_pick_fallbacks() {
        let mut rng = StdRng::seed_from_u64(7);
        let entries = [entry(None, Some("/files/t1.jpg")), entry(None, Some("/files/t2.jpg"))];
        assert_eq!(
            pick_representative_image(&entries, &mut rng).as_deref(),
            Some("/files/t1.jpg")
        );

        assert_eq!(pick_representative_image(&[entry(None, None)], &mut rng), None);
        assert_eq!(pick_representative_image(&[], &mut rng), None);
    }
}
