//! Category tree navigation and representative images.

#![allow(clippy::unwrap_used)]

use erp_storefront_integration_tests::{ErpSite, website_item};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn group(name: &str, parent: Option<&str>, image: Option<&str>) -> Value {
    json!({
        "name": name,
        "item_group_name": name,
        "parent_item_group": parent.unwrap_or(""),
        "is_group": 1,
        "image": image,
    })
}

async fn mount_tree(site: &ErpSite) {
    Mock::given(method("GET"))
        .and(path("/api/resource/Item%20Group"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            group("All Item Groups", None, None),
            group("Kitchen", Some("All Item Groups"), Some("/files/kitchen.jpg")),
            group("Garden", Some("All Item Groups"), Some("/files/garden.jpg")),
            group("Kettles", Some("Kitchen"), None),
        ]})))
        .mount(&site.server)
        .await;
}

#[tokio::test]
async fn roots_are_groups_without_parent() {
    let site = ErpSite::start().await;
    mount_tree(&site).await;

    let roots = site.client().list_root_categories().await.unwrap();

    assert_eq!(roots.len(), 1);
    assert_eq!(roots.first().unwrap().name, "All Item Groups");
}

#[tokio::test]
async fn children_carry_a_product_image_when_one_exists() {
    let site = ErpSite::start().await;
    mount_tree(&site).await;
    let mut kettle = website_item("WEB-1", "KETTLE-1", "Kitchen");
    kettle["website_image"] = json!("/files/kettle.jpg");
    site.website_items("\"item_group\",\"=\",\"Kitchen\"", vec![kettle])
        .await;
    // Garden has no products: its own image stays
    site.website_items("\"item_group\",\"=\",\"Garden\"", Vec::new())
        .await;

    let mut children = site
        .client()
        .list_children("All Item Groups")
        .await
        .unwrap();
    children.sort_by(|a, b| a.name.cmp(&b.name));

    let images: Vec<(&str, Option<&str>)> = children
        .iter()
        .map(|c| (c.name.as_str(), c.image.as_deref()))
        .collect();
    assert_eq!(
        images,
        [
            ("Garden", Some("/files/garden.jpg")),
            ("Kitchen", Some("/files/kettle.jpg")),
        ]
    );
}

#[tokio::test]
async fn leaf_category_has_no_children() {
    let site = ErpSite::start().await;
    mount_tree(&site).await;

    let children = site.client().list_children("Kettles").await.unwrap();

    assert!(children.is_empty());
}
