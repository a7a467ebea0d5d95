//! Website Item accessors and enrichment.

use std::collections::HashSet;

use erp_storefront_core::StockLevel;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

use super::ErpClient;
use crate::conversions::convert_website_item;
use crate::docs::{ITEM, ITEM_DEFAULT, ItemCodeDoc, WEBSITE_ITEM, WEBSITE_ITEM_FIELDS, WebsiteItemDoc};
use crate::error::{ErpError, Result};
use crate::query::{Filter, ListQuery, UNLIMITED};
use crate::types::{CatalogEntry, sort_for_listing};

/// Results returned by a catalog search.
pub const DEFAULT_SEARCH_LIMIT: u32 = 50;

/// Server-side ordering; the same order is re-applied after enrichment.
const LISTING_ORDER: &str = "ranking desc, creation desc";

/// Outcome of enriching one entry.
///
/// Enrichment never fails as a whole: a degraded entry keeps whatever could
/// be resolved and records what could not.
#[derive(Debug)]
enum Enrichment {
    Complete(CatalogEntry),
    Degraded {
        entry: CatalogEntry,
        failures: Vec<String>,
    },
}

impl Enrichment {
    fn into_entry(self) -> CatalogEntry {
        match self {
            Self::Complete(entry) => entry,
            Self::Degraded { entry, failures } => {
                warn!(
                    entry = %entry.id,
                    item_code = %entry.item_code,
                    failures = ?failures,
                    "Catalog entry enrichment degraded"
                );
                entry
            }
        }
    }
}

impl ErpClient {
    // =========================================================================
    // Public Accessors
    // =========================================================================

    /// Published catalog entries, enriched with price and stock.
    ///
    /// `published = 1` is always applied; `filters` narrow it further.
    /// A `limit` of [`UNLIMITED`] returns every match.
    ///
    /// # Errors
    ///
    /// Returns an error if the Website Item list cannot be fetched.
    /// Enrichment failures never fail the call.
    #[instrument(skip(self, filters), fields(filters = filters.len()))]
    pub async fn list_catalog(
        &self,
        filters: &[Filter],
        limit: u32,
        offset: u32,
    ) -> Result<Vec<CatalogEntry>> {
        let query = published_query()
            .filters(filters.iter().cloned())
            .limit(limit)
            .offset(offset);

        let docs = self.fetch_website_items(&query).await?;
        Ok(self.enrich_all(docs).await)
    }

    /// One catalog entry by Website Item name, item code or search text.
    ///
    /// Resolution order: Website Item name, then item code, then a text
    /// search that prefers an exact (case-insensitive) code or name match
    /// and otherwise takes the first hit. A step runs only if the previous
    /// one found nothing.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::NotFound` when every step comes up empty, or the
    /// first error that is not a "not found".
    #[instrument(skip(self))]
    pub async fn get_catalog_entry(&self, id: &str) -> Result<CatalogEntry> {
        let doc = match self.website_item_by_name(id).await? {
            Some(doc) => doc,
            None => match self.website_item_by_code(id).await? {
                Some(doc) => doc,
                None => {
                    debug!("No Website Item by name or code, falling back to search");
                    let hits = self.search_website_items(id, DEFAULT_SEARCH_LIMIT).await?;
                    best_match(hits, id)
                        .ok_or_else(|| ErpError::NotFound(format!("Catalog entry '{id}'")))?
                }
            },
        };

        Ok(self.enrich(convert_website_item(doc)).await.into_entry())
    }

    /// Text search over display name, item name and item code.
    ///
    /// When a company is given (or configured as the default), only items
    /// with an `Item Default` row for that company are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the search or the company lookup fails.
    #[instrument(skip(self))]
    pub async fn search_catalog(
        &self,
        query: &str,
        company: Option<&str>,
    ) -> Result<Vec<CatalogEntry>> {
        let mut docs = self
            .search_website_items(query, DEFAULT_SEARCH_LIMIT)
            .await?;

        let company = company.or(self.config().default_company.as_deref());
        if let Some(company) = company
            && !docs.is_empty()
        {
            let allowed = self.item_codes_for_company(company, &docs).await?;
            docs.retain(|doc| allowed.contains(&doc.item_code));
            debug!(company, kept = docs.len(), "Scoped search results to company");
        }

        Ok(self.enrich_all(docs).await)
    }

    // =========================================================================
    // Fetch Helpers
    // =========================================================================

    async fn fetch_website_items(&self, query: &ListQuery) -> Result<Vec<WebsiteItemDoc>> {
        let docs: Vec<WebsiteItemDoc> = self.transport().list(WEBSITE_ITEM, query).await?;
        Ok(docs.into_iter().filter(|doc| doc.published).collect())
    }

    /// Primary-key lookup. Unpublished and unreadable items count as missing.
    async fn website_item_by_name(&self, name: &str) -> Result<Option<WebsiteItemDoc>> {
        match self
            .transport()
            .get_doc::<WebsiteItemDoc>(WEBSITE_ITEM, name)
            .await
        {
            Ok(doc) if doc.published => Ok(Some(doc)),
            Ok(_) | Err(ErpError::NotFound(_)) => Ok(None),
            Err(ErpError::Decode(reason)) => {
                warn!(name, %reason, "Unreadable Website Item, trying other lookups");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn website_item_by_code(&self, item_code: &str) -> Result<Option<WebsiteItemDoc>> {
        let query = published_query()
            .filter(Filter::eq("item_code", item_code))
            .limit(1);
        Ok(self.fetch_website_items(&query).await?.into_iter().next())
    }

    async fn search_website_items(&self, text: &str, limit: u32) -> Result<Vec<WebsiteItemDoc>> {
        let text = text.trim();
        let mut query = published_query().limit(limit);
        if !text.is_empty() {
            query = query
                .or_filter(Filter::contains("web_item_name", text))
                .or_filter(Filter::contains("item_name", text))
                .or_filter(Filter::contains("item_code", text));
        }
        self.fetch_website_items(&query).await
    }

    /// Item codes among `docs` that have an `Item Default` for `company`.
    async fn item_codes_for_company(
        &self,
        company: &str,
        docs: &[WebsiteItemDoc],
    ) -> Result<HashSet<String>> {
        let codes: Vec<&str> = docs.iter().map(|doc| doc.item_code.as_str()).collect();
        let query = ListQuery::new()
            .fields(&["item_code"])
            .filter(Filter::eq("company", company).on(ITEM_DEFAULT))
            .filter(Filter::is_in("item_code", codes))
            .limit(UNLIMITED);

        let rows: Vec<ItemCodeDoc> = self.transport().list(ITEM, &query).await?;
        Ok(rows.into_iter().map(|row| row.item_code).collect())
    }

    // =========================================================================
    // Enrichment
    // =========================================================================

    /// Enrich every entry concurrently, then sort.
    pub(crate) async fn enrich_all(&self, docs: Vec<WebsiteItemDoc>) -> Vec<CatalogEntry> {
        let tasks = docs
            .into_iter()
            .map(|doc| self.enrich(convert_website_item(doc)));

        let mut entries: Vec<CatalogEntry> = join_all(tasks)
            .await
            .into_iter()
            .map(Enrichment::into_entry)
            .collect();

        sort_for_listing(&mut entries);
        entries
    }

    /// Attach price and stock to one entry. Both lookups run concurrently.
    async fn enrich(&self, mut entry: CatalogEntry) -> Enrichment {
        let mut failures = Vec::new();

        let price = self.price_quote(&entry.item_code, None);
        let stock = async {
            match entry.warehouse.as_deref() {
                Some(warehouse) => self
                    .stock_levels(warehouse, &entry.item_code)
                    .await
                    .map(|levels| StockLevel::total_available(&levels)),
                None => Err(ErpError::NotFound("no warehouse declared".to_string())),
            }
        };
        let (price, stock) = tokio::join!(price, stock);

        match price {
            Ok(quote) => entry.price = quote,
            Err(e) => failures.push(format!("price: {e}")),
        }
        match stock {
            Ok(available) => entry.available_stock = available,
            Err(e) => failures.push(format!("stock: {e}")),
        }

        if failures.is_empty() {
            Enrichment::Complete(entry)
        } else {
            Enrichment::Degraded { entry, failures }
        }
    }
}

fn published_query() -> ListQuery {
    ListQuery::new()
        .fields(WEBSITE_ITEM_FIELDS)
        .filter(Filter::eq("published", 1))
        .order_by(LISTING_ORDER)
}

/// Exact case-insensitive match on item code or a name, else the first hit.
fn best_match(hits: Vec<WebsiteItemDoc>, text: &str) -> Option<WebsiteItemDoc> {
    let wanted = text.trim().to_lowercase();
    let is_exact = |doc: &WebsiteItemDoc| {
        doc.item_code.to_lowercase() == wanted
            || [&doc.web_item_name, &doc.item_name]
                .into_iter()
                .flatten()
                .any(|name| name.to_lowercase() == wanted)
    };

    match hits.iter().position(is_exact) {
        Some(index) => hits.into_iter().nth(index),
        None => hits.into_iter().next(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use erp_storefront_core::ItemCode;
    use rust_decimal::Decimal;
    use secrecy::SecretString;
    use serde_json::{Value, json};
    use wiremock::matchers::{method, path, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::config::ErpConfig;
    use crate::retry::RetryPolicy;

    fn client(server: &MockServer) -> ErpClient {
        let config = ErpConfig::new(
            &server.uri(),
            "3c9e1f0a2b4d6e8",
            SecretString::from("9a8b7c6d5e4f3a2"),
        )
        .unwrap()
        .with_retry(RetryPolicy::new(1, Duration::ZERO));
        ErpClient::new(config).unwrap()
    }

    fn web_item(name: &str, code: &str, ranking: i64) -> Value {
        json!({
            "name": name,
            "item_code": code,
            "web_item_name": format!("{code} listing"),
            "published": 1,
            "ranking": ranking,
            "creation": "2024-01-01 10:00:00.000000",
            "website_warehouse": null,
        })
    }

    fn doc(value: Value) -> WebsiteItemDoc {
        serde_json::from_value(value).unwrap()
    }

    async fn mount_prices(server: &MockServer, rate: f64) {
        Mock::given(method("GET"))
            .and(path("/api/resource/Item%20Price"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                {"item_code": "ANY", "price_list": "Standard Selling", "price_list_rate": rate}
            ]})))
            .mount(server)
            .await;
    }

    #[test]
    fn test_best_match_prefers_exact_code() {
        let hits = vec![
            doc(web_item("WEB-1", "KETTLE-10", 0)),
            doc(web_item("WEB-2", "KETTLE-1", 0)),
        ];
        assert_eq!(best_match(hits, "kettle-1").unwrap().name, "WEB-2");
    }

    #[test]
    fn test_best_match_falls_back_to_first() {
        let hits = vec![
            doc(web_item("WEB-1", "KETTLE-10", 0)),
            doc(web_item("WEB-2", "KETTLE-11", 0)),
        ];
        assert_eq!(best_match(hits, "kettle").unwrap().name, "WEB-1");
        assert!(best_match(Vec::new(), "kettle").is_none());
    }

    #[tokio::test]
    async fn listing_drops_unpublished_rows_and_sorts() {
        let server = MockServer::start().await;
        let mut hidden = web_item("WEB-3", "HIDDEN", 99);
        hidden["published"] = json!(0);
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .and(query_param_contains("filters", "[\"Website Item\",\"published\",\"=\",1]"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                web_item("WEB-1", "LOW", 1),
                hidden,
                web_item("WEB-2", "HIGH", 5),
            ]})))
            .mount(&server)
            .await;
        mount_prices(&server, 10.0).await;

        let entries = client(&server).list_catalog(&[], 20, 0).await.unwrap();

        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["WEB-2", "WEB-1"]);
        assert!(entries.iter().all(|e| e.published));
        assert!(entries.iter().all(|e| e.price.is_some()));
        assert!(entries.iter().all(|e| e.available_stock.abs() < f64::EPSILON));
    }

    #[tokio::test]
    async fn get_falls_back_from_name_to_item_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item/KETTLE-1"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"exc_type": "DoesNotExistError"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .and(query_param_contains("filters", "\"item_code\",\"=\",\"KETTLE-1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                web_item("WEB-ITM-0042", "KETTLE-1", 0)
            ]})))
            .expect(1)
            .mount(&server)
            .await;
        mount_prices(&server, 25.0).await;

        let entry = client(&server).get_catalog_entry("KETTLE-1").await.unwrap();

        assert_eq!(entry.id, "WEB-ITM-0042");
        assert_eq!(entry.item_code, ItemCode::new("KETTLE-1"));
        assert_eq!(entry.price.unwrap().rate, Decimal::new(25, 0));
    }

    #[tokio::test]
    async fn get_skips_an_unreadable_website_item() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item/KETTLE-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": {"name": "KETTLE-1"}})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .and(query_param_contains("filters", "\"item_code\",\"=\",\"KETTLE-1\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                web_item("WEB-ITM-0042", "KETTLE-1", 0)
            ]})))
            .expect(1)
            .mount(&server)
            .await;
        mount_prices(&server, 25.0).await;

        let entry = client(&server).get_catalog_entry("KETTLE-1").await.unwrap();

        assert_eq!(entry.id, "WEB-ITM-0042");
    }

    #[tokio::test]
    async fn get_exhausting_every_step_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item/nothing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(2)
            .mount(&server)
            .await;

        let err = client(&server).get_catalog_entry("nothing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn get_propagates_server_errors_instead_of_falling_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item/WEB-1"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"exc_type": "PermissionError"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
            .expect(0)
            .mount(&server)
            .await;

        let err = client(&server).get_catalog_entry("WEB-1").await.unwrap_err();
        assert_eq!(err.status(), Some(403));
    }

    #[tokio::test]
    async fn search_scopes_to_company() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Website%20Item"))
            .and(query_param_contains("or_filters", "%kettle%"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                web_item("WEB-1", "KETTLE-1", 0),
                web_item("WEB-2", "KETTLE-2", 0),
            ]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Item"))
            .and(query_param_contains("filters", "[\"Item Default\",\"company\",\"=\",\"Wind Power LLC\"]"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"data": [{"item_code": "KETTLE-2"}]})),
            )
            .expect(1)
            .mount(&server)
            .await;
        mount_prices(&server, 5.0).await;

        let entries = client(&server)
            .search_catalog("kettle", Some("Wind Power LLC"))
            .await
            .unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries.first().unwrap().item_code, ItemCode::new("KETTLE-2"));
    }
}
