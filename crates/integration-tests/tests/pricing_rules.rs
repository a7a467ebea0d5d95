//! Resolving the products a pricing rule applies to.

#![allow(clippy::unwrap_used)]

use erp_storefront_client::ErpError;
use erp_storefront_integration_tests::{ErpSite, item_filter, website_item};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const KETTLES: &str = "[\"Website Item\",\"item_group\",\"=\",\"Kettles\"]";

async fn mount_rule(site: &ErpSite, rule: Value) {
    Mock::given(method("GET"))
        .and(path("/api/resource/Pricing%20Rule/PRLE-0001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": rule})))
        .mount(&site.server)
        .await;
}

fn ten_percent_rule(disable: u8) -> Value {
    json!({
        "name": "PRLE-0001",
        "title": "Spring kettles",
        "disable": disable,
        "rate_or_discount": "Discount Percentage",
        "discount_percentage": 10,
        "items": [{"item_code": "X"}],
        "item_groups": [{"item_group": "Kettles"}],
    })
}

#[tokio::test]
async fn explicit_items_and_discounted_group_members_are_unioned() {
    let site = ErpSite::start().await;
    mount_rule(&site, ten_percent_rule(0)).await;
    site.no_website_item_names().await;
    site.website_items(&item_filter("X"), vec![website_item("WEB-X", "X", "Mugs")])
        .await;
    // X shows up again through the group; it must not be duplicated
    site.website_items(
        KETTLES,
        vec![
            website_item("WEB-Y", "Y", "Kettles"),
            website_item("WEB-Z", "Z", "Kettles"),
            website_item("WEB-X", "X", "Kettles"),
        ],
    )
    .await;
    site.price("X", 20.0).await;
    site.price("Y", 0.0).await;
    site.price("Z", 50.0).await;

    let products = site
        .client()
        .resolve_rule_products("PRLE-0001")
        .await
        .unwrap();

    let mut ids: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
    ids.sort_unstable();
    assert_eq!(ids, ["WEB-X", "WEB-Z"]);

    let z = products.iter().find(|p| p.id == "WEB-Z").unwrap();
    let discount = z.discount.as_ref().unwrap();
    assert_eq!(discount.rule, "PRLE-0001");
    assert_eq!(discount.amount, Decimal::new(5, 0));
    assert_eq!(discount.percentage, Some(Decimal::new(10, 0)));
}

#[tokio::test]
async fn explicit_item_without_price_is_still_listed() {
    let site = ErpSite::start().await;
    mount_rule(
        &site,
        json!({
            "name": "PRLE-0001",
            "disable": 0,
            "rate_or_discount": "Discount Amount",
            "discount_amount": 3,
            "items": [{"item_code": "X"}, {"item_code": "GONE"}],
        }),
    )
    .await;
    site.no_website_item_names().await;
    site.website_items(&item_filter("X"), vec![website_item("WEB-X", "X", "Mugs")])
        .await;
    // Any other lookup (the search fallback for GONE) finds nothing
    site.website_items("published", Vec::new()).await;

    let products = site
        .client()
        .resolve_rule_products("PRLE-0001")
        .await
        .unwrap();

    assert_eq!(products.len(), 1);
    let x = products.first().unwrap();
    assert_eq!(x.id, "WEB-X");
    assert!(x.discount.is_none());
}

#[tokio::test]
async fn disabled_rule_applies_to_nothing() {
    let site = ErpSite::start().await;
    mount_rule(&site, ten_percent_rule(1)).await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Website%20Item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&site.server)
        .await;

    let products = site
        .client()
        .resolve_rule_products("PRLE-0001")
        .await
        .unwrap();

    assert!(products.is_empty());
}

#[tokio::test]
async fn expired_rule_applies_to_nothing() {
    let site = ErpSite::start().await;
    let mut rule = ten_percent_rule(0);
    rule["valid_from"] = json!("2020-01-01");
    rule["valid_upto"] = json!("2020-12-31");
    mount_rule(&site, rule).await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Website%20Item"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(0)
        .mount(&site.server)
        .await;

    let products = site
        .client()
        .resolve_rule_products("PRLE-0001")
        .await
        .unwrap();

    assert!(products.is_empty());
}

#[tokio::test]
async fn unknown_rule_is_not_found() {
    let site = ErpSite::start().await;

    let err = site
        .client()
        .resolve_rule_products("PRLE-9999")
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::NotFound(_)));
}
