//! Pricing rule conversions.

use erp_storefront_core::ItemCode;
use rust_decimal::Decimal;

use crate::docs::PricingRuleDoc;
use crate::types::{DiscountKind, PricingRule};

pub fn convert_pricing_rule(doc: PricingRuleDoc) -> PricingRule {
    let discount = match doc.rate_or_discount.as_deref() {
        Some("Discount Amount") => DiscountKind::Amount(doc.discount_amount.unwrap_or_default()),
        Some("Rate") => DiscountKind::Rate(doc.rate.unwrap_or_default()),
        // "Discount Percentage" is ERPNext's default mode
        _ => DiscountKind::Percentage(doc.discount_percentage.unwrap_or(Decimal::ZERO)),
    };

    PricingRule {
        name: doc.name,
        title: doc.title,
        enabled: !doc.disable,
        discount,
        valid_from: doc.valid_from,
        valid_upto: doc.valid_upto,
        item_codes: doc
            .items
            .into_iter()
            .map(|row| ItemCode::new(row.item_code))
            .collect(),
        item_groups: doc.item_groups.into_iter().map(|row| row.item_group).collect(),
    }
}
