//! Catalog, price, stock, category and pricing rule commands.

use clap::Subcommand;
use erp_storefront_client::{ErpClient, Filter, ItemCode, descendants_of};
use serde_json::json;

use super::{CommandResult, emit};

#[derive(Subcommand)]
pub enum CatalogAction {
    /// List published entries, best-ranked first
    List {
        /// Page size
        #[arg(short, long, default_value_t = 24)]
        limit: u32,

        /// Rows to skip
        #[arg(short, long, default_value_t = 0)]
        offset: u32,

        /// Only entries in this item group
        #[arg(short, long)]
        group: Option<String>,
    },
    /// Show one entry by Website Item name or item code
    Get {
        /// Website Item name or item code
        id: String,
    },
    /// Search entries by name
    Search {
        /// Text to look for
        query: String,

        /// Company to scope the search to
        #[arg(short, long)]
        company: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CategoryAction {
    /// Top-level categories
    Roots,
    /// Direct children of a category, with representative images
    Children {
        /// Parent category name
        parent: String,
    },
    /// Every category below a parent
    Descendants {
        /// Parent category name
        parent: String,
    },
}

#[derive(Subcommand)]
pub enum RuleAction {
    /// Enabled selling rules
    List,
    /// Products a rule applies to, with the discount attached
    Products {
        /// Pricing Rule name
        name: String,
    },
}

pub async fn catalog(client: &ErpClient, action: CatalogAction) -> CommandResult {
    match action {
        CatalogAction::List {
            limit,
            offset,
            group,
        } => {
            let filters: Vec<Filter> = group
                .iter()
                .map(|g| Filter::eq("item_group", g.as_str()))
                .collect();
            let entries = client.list_catalog(&filters, limit, offset).await?;
            tracing::info!(count = entries.len(), "Listed catalog");
            emit(&entries)?;
        }
        CatalogAction::Get { id } => emit(&client.get_catalog_entry(&id).await?)?,
        CatalogAction::Search { query, company } => {
            let entries = client.search_catalog(&query, company.as_deref()).await?;
            tracing::info!(count = entries.len(), "Search finished");
            emit(&entries)?;
        }
    }
    Ok(())
}

pub async fn price(client: &ErpClient, item_code: &str, price_list: Option<&str>) -> CommandResult {
    let item_code = ItemCode::new(item_code);
    let quote = client.price_quote(&item_code, price_list).await?;
    emit(&json!({
        "item_code": item_code,
        "quote": quote,
    }))?;
    Ok(())
}

pub async fn stock(client: &ErpClient, item_code: &str, warehouse: &str) -> CommandResult {
    let item_code = ItemCode::new(item_code);
    let levels = client.stock_levels(warehouse, &item_code).await?;
    emit(&levels)?;
    Ok(())
}

pub async fn categories(client: &ErpClient, action: CategoryAction) -> CommandResult {
    match action {
        CategoryAction::Roots => emit(&client.list_root_categories().await?)?,
        CategoryAction::Children { parent } => emit(&client.list_children(&parent).await?)?,
        CategoryAction::Descendants { parent } => {
            let tree = client.list_categories().await?;
            emit(&descendants_of(&tree, &parent))?;
        }
    }
    Ok(())
}

pub async fn rules(client: &ErpClient, action: RuleAction) -> CommandResult {
    match action {
        RuleAction::List => emit(&client.list_pricing_rules().await?)?,
        RuleAction::Products { name } => {
            let products = client.resolve_rule_products(&name).await?;
            tracing::info!(rule = %name, count = products.len(), "Resolved rule products");
            emit(&products)?;
        }
    }
    Ok(())
}
