//! Stock resolution from Bin counters.

use erp_storefront_core::{ItemCode, StockLevel};
use tracing::{instrument, warn};

use super::ErpClient;
use crate::docs::{BIN, BIN_FIELDS, BinDoc};
use crate::error::Result;
use crate::query::{Filter, ListQuery, UNLIMITED};

impl ErpClient {
    /// Sellable quantity of an item in a warehouse.
    ///
    /// Never fails and never goes below zero: a missing warehouse or a
    /// failed lookup both read as 0.
    #[instrument(skip(self), fields(item_code = %item_code))]
    pub async fn resolve_stock(&self, warehouse: Option<&str>, item_code: &ItemCode) -> f64 {
        let Some(warehouse) = warehouse else {
            warn!("No warehouse declared, treating stock as 0");
            return 0.0;
        };

        match self.stock_levels(warehouse, item_code).await {
            Ok(levels) => StockLevel::total_available(&levels),
            Err(e) => {
                warn!(warehouse, error = %e, "Stock lookup failed, treating stock as 0");
                0.0
            }
        }
    }

    /// Bins holding the item in the warehouse.
    ///
    /// # Errors
    ///
    /// Returns an error if the Bin list cannot be fetched.
    pub async fn stock_levels(
        &self,
        warehouse: &str,
        item_code: &ItemCode,
    ) -> Result<Vec<StockLevel>> {
        let query = ListQuery::new()
            .fields(BIN_FIELDS)
            .filter(Filter::eq("warehouse", warehouse))
            .filter(Filter::eq("item_code", item_code.as_str()))
            .limit(UNLIMITED);

        let bins: Vec<BinDoc> = self.transport().list(BIN, &query).await?;

        Ok(bins
            .into_iter()
            .map(|bin| StockLevel {
                item_code: ItemCode::new(bin.item_code),
                warehouse: bin.warehouse,
                actual_qty: bin.actual_qty,
                reserved_qty: bin.reserved_qty,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{method, path};
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

    #[tokio::test]
    async fn over_reserved_bin_reads_as_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Bin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
                {"item_code": "KETTLE-1", "warehouse": "Stores - WP", "actual_qty": 2.0, "reserved_qty": 5.0},
                {"item_code": "KETTLE-1", "warehouse": "Stores - WP", "actual_qty": 4.0, "reserved_qty": null},
            ]})))
            .mount(&server)
            .await;

        let stock = client(&server)
            .resolve_stock(Some("Stores - WP"), &ItemCode::new("KETTLE-1"))
            .await;

        assert!((stock - 4.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn missing_warehouse_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let stock = client(&server)
            .resolve_stock(None, &ItemCode::new("KETTLE-1"))
            .await;

        assert!(stock.abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn failed_lookup_is_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/resource/Bin"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({"exc_type": "PermissionError"})))
            .mount(&server)
            .await;

        let stock = client(&server)
            .resolve_stock(Some("Stores - WP"), &ItemCode::new("KETTLE-1"))
            .await;

        assert!(stock.abs() < f64::EPSILON);
    }
}
