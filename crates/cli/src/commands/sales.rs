//! Order, invoice and address commands.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use erp_storefront_client::{
    CustomerId, ErpClient, ItemCode, NewAddress, NewOrderLine, NewSalesOrder,
};
use rust_decimal::Decimal;

use super::{CliError, CommandResult, emit};

#[derive(Subcommand)]
pub enum OrderAction {
    /// A customer's orders, newest first
    List {
        /// Customer name
        customer: String,

        /// Maximum number of orders
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// One order with its lines
    Get {
        /// Sales Order name
        name: String,
    },
    /// Place an order
    Create {
        /// Customer name
        customer: String,

        /// Delivery date (YYYY-MM-DD)
        #[arg(short, long)]
        delivery_date: NaiveDate,

        /// Order line as CODE:QTY or CODE:QTY@RATE (repeatable)
        #[arg(short = 'l', long = "line", value_parser = parse_line, required = true)]
        lines: Vec<NewOrderLine>,

        /// Selling company
        #[arg(short, long)]
        company: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum InvoiceAction {
    /// A customer's invoices, newest first
    List {
        /// Customer name
        customer: String,

        /// Maximum number of invoices
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// One invoice
    Get {
        /// Sales Invoice name
        name: String,
    },
}

#[derive(Subcommand)]
pub enum AddressAction {
    /// Addresses linked to a customer
    List {
        /// Customer name
        customer: String,
    },
    /// Link a new address to a customer
    Add {
        /// Customer name
        customer: String,

        #[command(flatten)]
        address: AddressArgs,
    },
}

#[derive(Args)]
pub struct AddressArgs {
    /// Address title
    #[arg(long)]
    title: String,

    /// `Billing` or `Shipping`
    #[arg(long, default_value = "Shipping")]
    address_type: String,

    /// First address line
    #[arg(long)]
    line1: String,

    /// Second address line
    #[arg(long)]
    line2: Option<String>,

    #[arg(long)]
    city: String,

    #[arg(long)]
    state: Option<String>,

    #[arg(long)]
    postal_code: Option<String>,

    #[arg(long)]
    country: String,

    #[arg(long)]
    phone: Option<String>,

    #[arg(long)]
    email: Option<String>,

    /// Mark as the preferred shipping address
    #[arg(long)]
    shipping: bool,
}

impl From<AddressArgs> for NewAddress {
    fn from(args: AddressArgs) -> Self {
        Self {
            title: args.title,
            address_type: args.address_type,
            line1: args.line1,
            line2: args.line2,
            city: args.city,
            state: args.state,
            postal_code: args.postal_code,
            country: args.country,
            phone: args.phone,
            email: args.email,
            is_shipping: args.shipping,
        }
    }
}

pub async fn orders(client: &ErpClient, action: OrderAction) -> CommandResult {
    match action {
        OrderAction::List { customer, limit } => {
            let orders = client
                .list_sales_orders(&CustomerId::new(customer), limit)
                .await?;
            emit(&orders)?;
        }
        OrderAction::Get { name } => emit(&client.get_sales_order(&name).await?)?,
        OrderAction::Create {
            customer,
            delivery_date,
            lines,
            company,
        } => {
            let order = NewSalesOrder {
                customer: CustomerId::new(customer),
                company,
                delivery_date,
                lines,
            };
            let created = client.create_sales_order(&order).await?;
            tracing::info!(order = %created.id, "Sales order created");
            emit(&created)?;
        }
    }
    Ok(())
}

pub async fn invoices(client: &ErpClient, action: InvoiceAction) -> CommandResult {
    match action {
        InvoiceAction::List { customer, limit } => {
            let invoices = client
                .list_sales_invoices(&CustomerId::new(customer), limit)
                .await?;
            emit(&invoices)?;
        }
        InvoiceAction::Get { name } => emit(&client.get_sales_invoice(&name).await?)?,
    }
    Ok(())
}

pub async fn addresses(client: &ErpClient, action: AddressAction) -> CommandResult {
    match action {
        AddressAction::List { customer } => {
            emit(&client.list_addresses(&CustomerId::new(customer)).await?)?;
        }
        AddressAction::Add { customer, address } => {
            let created = client
                .create_address(&CustomerId::new(customer), &address.into())
                .await?;
            emit(&created)?;
        }
    }
    Ok(())
}

/// Parse `CODE:QTY` or `CODE:QTY@RATE`.
fn parse_line(raw: &str) -> Result<NewOrderLine, CliError> {
    let invalid = || CliError::InvalidArgument(format!("order line '{raw}', expected CODE:QTY[@RATE]"));

    let (code, rest) = raw.rsplit_once(':').ok_or_else(invalid)?;
    let code = code.trim();
    if code.is_empty() {
        return Err(invalid());
    }

    let (qty, rate) = match rest.split_once('@') {
        Some((qty, rate)) => (qty, Some(rate.trim().parse::<Decimal>().map_err(|_| invalid())?)),
        None => (rest, None),
    };
    let qty: f64 = qty.trim().parse().map_err(|_| invalid())?;
    if !qty.is_finite() || qty <= 0.0 {
        return Err(invalid());
    }

    Ok(NewOrderLine {
        item_code: ItemCode::new(code),
        qty,
        rate,
    })
}
