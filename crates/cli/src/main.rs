//! ERP Storefront CLI - drive the ERPNext storefront client from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # First page of the published catalog
//! storefront-cli catalog list --limit 10
//!
//! # Price and stock for one item
//! storefront-cli price KETTLE-1 --price-list "Retail"
//! storefront-cli stock KETTLE-1 --warehouse "Stores - WP"
//!
//! # Products discounted by a pricing rule
//! storefront-cli rules products PRLE-0001
//!
//! # Wishlist of a storefront user (password from STOREFRONT_PASSWORD)
//! storefront-cli wishlist --identifier jane@example.com add KETTLE-1 --qty 2
//! ```
//!
//! # Environment Variables
//!
//! - `ERPNEXT_BASE_URL`, `ERPNEXT_API_KEY`, `ERPNEXT_API_SECRET` - site and
//!   integration user (required)
//! - `ERPNEXT_COMPANY`, `ERPNEXT_PRICE_LIST`, `ERPNEXT_FALLBACK_PRICE_LIST`,
//!   `ERPNEXT_TIMEOUT_SECS` - optional defaults
//! - `STOREFRONT_USER`, `STOREFRONT_PASSWORD` - customer credentials for
//!   `login` and `wishlist`
//!
//! Results are printed to stdout as pretty JSON; logs go to stderr.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use erp_storefront_client::{ErpClient, ErpConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::account::{Credentials, WishlistAction};
use commands::catalog::{CatalogAction, CategoryAction, RuleAction};
use commands::sales::{AddressAction, InvoiceAction, OrderAction};

#[derive(Parser)]
#[command(name = "storefront-cli")]
#[command(author, version, about = "ERPNext storefront tools")]
struct Cli {
    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the published catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Resolve the selling price of an item
    Price {
        /// Item code
        item_code: String,

        /// Price list to try before the configured ones
        #[arg(short, long)]
        price_list: Option<String>,
    },
    /// Show stock counters for an item
    Stock {
        /// Item code
        item_code: String,

        /// Warehouse to read
        #[arg(short, long)]
        warehouse: String,
    },
    /// Navigate the category tree
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Inspect pricing rules
    Rules {
        #[command(subcommand)]
        action: RuleAction,
    },
    /// Customer sales orders
    Orders {
        #[command(subcommand)]
        action: OrderAction,
    },
    /// Customer sales invoices
    Invoices {
        #[command(subcommand)]
        action: InvoiceAction,
    },
    /// Customer addresses
    Addresses {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Check customer credentials and show the resolved session
    Login {
        #[command(flatten)]
        credentials: Credentials,
    },
    /// Manage a customer's wishlist
    Wishlist {
        #[command(flatten)]
        credentials: Credentials,

        #[command(subcommand)]
        action: WishlistAction,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed arguments see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.json);

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn init_tracing(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "erp_storefront_client=info,erp_storefront_cli=info".into());

    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = ErpClient::new(ErpConfig::from_env()?)?;

    match cli.command {
        Commands::Catalog { action } => commands::catalog::catalog(&client, action).await?,
        Commands::Price {
            item_code,
            price_list,
        } => commands::catalog::price(&client, &item_code, price_list.as_deref()).await?,
        Commands::Stock {
            item_code,
            warehouse,
        } => commands::catalog::stock(&client, &item_code, &warehouse).await?,
        Commands::Categories { action } => commands::catalog::categories(&client, action).await?,
        Commands::Rules { action } => commands::catalog::rules(&client, action).await?,
        Commands::Orders { action } => commands::sales::orders(&client, action).await?,
        Commands::Invoices { action } => commands::sales::invoices(&client, action).await?,
        Commands::Addresses { action } => commands::sales::addresses(&client, action).await?,
        Commands::Login { credentials } => commands::account::login(&client, &credentials).await?,
        Commands::Wishlist {
            credentials,
            action,
        } => commands::account::wishlist(&client, &credentials, action).await?,
    }
    Ok(())
}
