//! Retry budget on transient failures, in real time with short delays.

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use erp_storefront_client::{ErpError, ItemCode};
use erp_storefront_integration_tests::{ErpSite, client_for, quick_retry};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_millis(200);

fn slow() -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({"data": []}))
        .set_delay(Duration::from_secs(2))
}

#[tokio::test]
async fn timeouts_are_retried_until_one_succeeds() {
    let site = ErpSite::start().await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Bin"))
        .respond_with(slow())
        .up_to_n_times(2)
        .expect(2)
        .mount(&site.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Bin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
            "item_code": "KETTLE-1",
            "warehouse": "Stores - WP",
            "actual_qty": 7,
            "reserved_qty": 0,
        }]})))
        .expect(1)
        .mount(&site.server)
        .await;

    let client = client_for(site.config().with_timeout(TIMEOUT).with_retry(quick_retry(3)));
    let levels = client
        .stock_levels("Stores - WP", &ItemCode::new("KETTLE-1"))
        .await
        .unwrap();

    assert_eq!(levels.len(), 1);
}

#[tokio::test]
async fn retries_stop_at_the_attempt_budget() {
    let site = ErpSite::start().await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Bin"))
        .respond_with(slow())
        .expect(3)
        .mount(&site.server)
        .await;

    let client = client_for(site.config().with_timeout(TIMEOUT).with_retry(quick_retry(3)));
    let err = client
        .stock_levels("Stores - WP", &ItemCode::new("KETTLE-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Timeout { .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn malformed_bodies_are_not_retried() {
    let site = ErpSite::start().await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Bin"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>upstream error</html>"))
        .expect(1)
        .mount(&site.server)
        .await;

    let client = client_for(site.config().with_retry(quick_retry(3)));
    let err = client
        .stock_levels("Stores - WP", &ItemCode::new("KETTLE-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, ErpError::Decode(_)));
}

#[tokio::test]
async fn validation_errors_are_not_retried() {
    let site = ErpSite::start().await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Bin"))
        .respond_with(ResponseTemplate::new(417).set_body_json(json!({
            "exc_type": "ValidationError",
            "_server_messages": "[\"{\\\"message\\\": \\\"Field not permitted in query\\\"}\"]",
        })))
        .expect(1)
        .mount(&site.server)
        .await;

    let client = client_for(site.config().with_retry(quick_retry(3)));
    let err = client
        .stock_levels("Stores - WP", &ItemCode::new("KETTLE-1"))
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(417));
    assert_eq!(err.user_message(), "Field not permitted in query");
}
