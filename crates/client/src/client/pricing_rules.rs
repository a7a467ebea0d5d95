//! Pricing rules and the products they discount.

use std::collections::HashSet;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, instrument, warn};

use super::ErpClient;
use crate::conversions::convert_pricing_rule;
use crate::docs::{PRICING_RULE, PRICING_RULE_FIELDS, PricingRuleDoc};
use crate::error::Result;
use crate::query::{Filter, ListQuery, UNLIMITED};
use crate::types::{CatalogEntry, PricingRule};

impl ErpClient {
    /// Enabled selling rules.
    ///
    /// List results carry no child tables, so `item_codes` and
    /// `item_groups` are empty; use [`Self::get_pricing_rule`] for those.
    ///
    /// # Errors
    ///
    /// Returns an error if the Pricing Rule list cannot be fetched.
    #[instrument(skip(self))]
    pub async fn list_pricing_rules(&self) -> Result<Vec<PricingRule>> {
        let query = ListQuery::new()
            .fields(PRICING_RULE_FIELDS)
            .filter(Filter::eq("disable", 0))
            .filter(Filter::eq("selling", 1))
            .order_by("modified desc")
            .limit(UNLIMITED);

        let docs: Vec<PricingRuleDoc> = self.transport().list(PRICING_RULE, &query).await?;
        Ok(docs.into_iter().map(convert_pricing_rule).collect())
    }

    /// A full rule including the item codes and groups it applies to.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::NotFound` if the rule does not exist.
    pub async fn get_pricing_rule(&self, name: &str) -> Result<PricingRule> {
        let doc: PricingRuleDoc = self.transport().get_doc(PRICING_RULE, name).await?;
        Ok(convert_pricing_rule(doc))
    }

    /// Catalog entries a rule applies to, each with the discount attached.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule cannot be fetched or a group listing
    /// fails. Individual item codes that cannot be resolved are skipped.
    #[instrument(skip(self))]
    pub async fn resolve_rule_products(&self, rule_name: &str) -> Result<Vec<CatalogEntry>> {
        let rule = self.get_pricing_rule(rule_name).await?;
        self.products_for_rule(&rule).await
    }

    /// Like [`Self::resolve_rule_products`] for a rule already in hand.
    ///
    /// Explicit item codes are included whatever their discount; group
    /// members are included only when the rule takes something off their
    /// price. Results are deduplicated by entry id, first occurrence wins.
    /// A disabled rule, or one whose validity window excludes today, applies
    /// to nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if a group listing fails.
    pub async fn products_for_rule(&self, rule: &PricingRule) -> Result<Vec<CatalogEntry>> {
        if !rule.is_active_on(Utc::now().date_naive()) {
            debug!(rule = %rule.name, "Rule is disabled or outside its validity window");
            return Ok(Vec::new());
        }

        let mut products = Vec::new();

        let lookups = rule
            .item_codes
            .iter()
            .map(|code| async move { (code, self.get_catalog_entry(code.as_str()).await) });
        for (code, result) in join_all(lookups).await {
            match result {
                Ok(mut entry) => {
                    entry.discount = rule.apply_to(&entry);
                    products.push(entry);
                }
                Err(e) => warn!(rule = %rule.name, item_code = %code, error = %e, "Skipping rule item"),
            }
        }

        for group in &rule.item_groups {
            let members = self
                .list_catalog(&[Filter::eq("item_group", group.as_str())], UNLIMITED, 0)
                .await?;
            let discounted = members.into_iter().filter_map(|mut entry| {
                entry.discount = rule.apply_to(&entry);
                entry.discount.is_some().then_some(entry)
            });
            products.extend(discounted);
        }

        Ok(dedup_by_id(products))
    }
}

/// Keep the first entry for each id.
fn dedup_by_id(entries: Vec<CatalogEntry>) -> Vec<CatalogEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(entry.id.clone()))
        .collect()
}
