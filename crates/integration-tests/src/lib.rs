//! Shared fixtures for the storefront client integration tests.
//!
//! Every test gets its own [`ErpSite`]: a `wiremock` server standing in for
//! an ERPNext site, plus helpers that mount the documents a scenario needs.
//! Nothing here talks to a real site.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p erp-storefront-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use erp_storefront_client::{ErpClient, ErpConfig, RetryPolicy};
use secrecy::SecretString;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, path_regex, query_param_contains};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Warehouse every fixture item is stocked in.
pub const WAREHOUSE: &str = "Stores - WP";

/// A mock ERPNext site.
pub struct ErpSite {
    pub server: MockServer,
}

impl ErpSite {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Configuration pointing at the mock with a single attempt per call.
    ///
    /// # Panics
    ///
    /// Panics if the mock URI does not parse, which would be a wiremock bug.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn config(&self) -> ErpConfig {
        ErpConfig::new(
            &self.server.uri(),
            "3c9e1f0a2b4d6e8",
            SecretString::from("9a8b7c6d5e4f3a2"),
        )
        .unwrap()
        .with_retry(RetryPolicy::no_retry())
    }

    /// Client over [`Self::config`].
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> ErpClient {
        client_for(self.config())
    }

    /// Answer Website Item listings whose filters contain `filter_fragment`.
    pub async fn website_items(&self, filter_fragment: &str, rows: Vec<Value>) {
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .and(query_param_contains("filters", filter_fragment))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": rows})))
            .mount(&self.server)
            .await;
    }

    /// Every Website Item primary-key lookup misses.
    pub async fn no_website_item_names(&self) {
        Mock::given(method("GET"))
            .and(path_regex(r"^/api/resource/Website%20Item/.+"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"exc_type": "DoesNotExistError"})),
            )
            .mount(&self.server)
            .await;
    }

    /// Selling price for one item in every price list.
    pub async fn price(&self, item_code: &str, rate: f64) {
        Mock::given(method("GET"))
            .and(path("/api/resource/Item%20Price"))
            .and(query_param_contains("filters", item_filter(item_code)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
                "item_code": item_code,
                "price_list": "Standard Selling",
                "price_list_rate": rate,
            }]})))
            .mount(&self.server)
            .await;
    }

    /// Item Price lookups for one item fail with `status`.
    pub async fn price_failure(&self, item_code: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path("/api/resource/Item%20Price"))
            .and(query_param_contains("filters", item_filter(item_code)))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "exc_type": "InternalServerError",
                "exception": "pymysql.err.OperationalError: (2013, 'Lost connection')",
            })))
            .mount(&self.server)
            .await;
    }

    /// One Bin for the item in [`WAREHOUSE`].
    pub async fn bin(&self, item_code: &str, actual_qty: f64, reserved_qty: f64) {
        Mock::given(method("GET"))
            .and(path("/api/resource/Bin"))
            .and(query_param_contains("filters", item_filter(item_code)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{
                "item_code": item_code,
                "warehouse": WAREHOUSE,
                "actual_qty": actual_qty,
                "reserved_qty": reserved_qty,
            }]})))
            .mount(&self.server)
            .await;
    }

    /// Serve a stateful wishlist for `user` and return its store.
    pub async fn wishlist(&self, user: &str) -> WishlistStore {
        let store = WishlistStore::new(user);
        Mock::given(path_regex(r"^/api/resource/Wishlist"))
            .respond_with(store.clone())
            .mount(&self.server)
            .await;
        store
    }
}

/// Build a client, panicking on failure.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn client_for(config: ErpConfig) -> ErpClient {
    ErpClient::new(config).unwrap()
}

/// Published Website Item stocked in [`WAREHOUSE`].
#[must_use]
pub fn website_item(name: &str, item_code: &str, item_group: &str) -> Value {
    json!({
        "name": name,
        "item_code": item_code,
        "web_item_name": format!("{item_code} listing"),
        "item_name": item_code,
        "item_group": item_group,
        "published": 1,
        "ranking": 0,
        "creation": "2024-01-01 10:00:00.000000",
        "website_warehouse": WAREHOUSE,
    })
}

/// Query fragment matching `item_code = {code}` in a filters parameter.
#[must_use]
pub fn item_filter(item_code: &str) -> String {
    format!("\"item_code\",\"=\",\"{item_code}\"")
}

// =============================================================================
// Wishlist Store
// =============================================================================

/// In-memory Wishlist document answering GET, POST and PUT like ERPNext.
#[derive(Clone)]
pub struct WishlistStore {
    user: String,
    doc: Arc<Mutex<Option<Value>>>,
    writes: Arc<Mutex<u32>>,
}

impl WishlistStore {
    fn new(user: &str) -> Self {
        Self {
            user: user.to_string(),
            doc: Arc::new(Mutex::new(None)),
            writes: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of POST and PUT requests served.
    #[must_use]
    pub fn writes(&self) -> u32 {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record_write(&self) {
        *self.writes.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

impl Respond for WishlistStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut doc = self.doc.lock().unwrap_or_else(PoisonError::into_inner);
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);

        match request.method.as_str() {
            "GET" => match doc.as_ref() {
                Some(current) => ResponseTemplate::new(200).set_body_json(json!({"data": current})),
                None => ResponseTemplate::new(404).set_body_json(json!({
                    "exc_type": "DoesNotExistError",
                    "message": format!("Wishlist {} not found", self.user),
                })),
            },
            "POST" => {
                self.record_write();
                let created = json!({
                    "name": self.user,
                    "user": body.get("user").cloned().unwrap_or(Value::Null),
                    "items": [],
                });
                *doc = Some(created.clone());
                ResponseTemplate::new(200).set_body_json(json!({"data": created}))
            }
            "PUT" => {
                self.record_write();
                let Some(current) = doc.as_mut() else {
                    return ResponseTemplate::new(404);
                };
                let items: Vec<Value> = body
                    .get("items")
                    .and_then(Value::as_array)
                    .cloned()
                    .unwrap_or_default()
                    .into_iter()
                    .enumerate()
                    .map(|(i, mut row)| {
                        if row.get("name").is_none() {
                            row["name"] = json!(format!("wl-row-{i}"));
                        }
                        row
                    })
                    .collect();
                current["items"] = Value::Array(items);
                ResponseTemplate::new(200).set_body_json(json!({"data": current}))
            }
            _ => ResponseTemplate::new(405),
        }
    }
}

/// Short real-time retry budget for tests that exercise retries.
#[must_use]
pub const fn quick_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts, Duration::from_millis(10))
}
