//! Sales orders, invoices, addresses and customer lookups.

use erp_storefront_core::CustomerId;
use tracing::{debug, instrument};

use super::ErpClient;
use crate::conversions::{
    convert_address, convert_sales_invoice, convert_sales_order, new_address_body,
    new_sales_order_body,
};
use crate::docs::{
    ADDRESS, ADDRESS_FIELDS, AddressDoc, CUSTOMER, DYNAMIC_LINK, NamedDoc, SALES_INVOICE,
    SALES_INVOICE_FIELDS, SALES_ORDER, SALES_ORDER_FIELDS, SalesInvoiceDoc, SalesOrderDoc, USER,
};
use crate::error::{ErpError, Result, none_if_missing};
use crate::query::{Filter, ListQuery, UNLIMITED};
use crate::types::{Address, NewAddress, NewSalesOrder, SalesInvoice, SalesOrder};

impl ErpClient {
    // =========================================================================
    // Sales Orders
    // =========================================================================

    /// A customer's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the Sales Order list cannot be fetched.
    #[instrument(skip(self), fields(customer = %customer))]
    pub async fn list_sales_orders(
        &self,
        customer: &CustomerId,
        limit: u32,
    ) -> Result<Vec<SalesOrder>> {
        let query = ListQuery::new()
            .fields(SALES_ORDER_FIELDS)
            .filter(Filter::eq("customer", customer.as_str()))
            .order_by("transaction_date desc, creation desc")
            .limit(limit);

        let docs: Vec<SalesOrderDoc> = self.transport().list(SALES_ORDER, &query).await?;
        Ok(docs.into_iter().map(convert_sales_order).collect())
    }

    /// One order with its lines.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::NotFound` if the order does not exist.
    #[instrument(skip(self))]
    pub async fn get_sales_order(&self, name: &str) -> Result<SalesOrder> {
        let doc: SalesOrderDoc = self.transport().get_doc(SALES_ORDER, name).await?;
        Ok(convert_sales_order(doc))
    }

    /// Place an order for a checked-out cart.
    ///
    /// The order's company falls back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::Request` for an order without lines, or the
    /// server's validation error.
    #[instrument(skip(self, order), fields(customer = %order.customer, lines = order.lines.len()))]
    pub async fn create_sales_order(&self, order: &NewSalesOrder) -> Result<SalesOrder> {
        if order.lines.is_empty() {
            return Err(ErpError::Request(
                "a sales order needs at least one line".to_string(),
            ));
        }

        let company = order
            .company
            .as_deref()
            .or(self.config().default_company.as_deref());
        let body = new_sales_order_body(order, company);

        let doc: SalesOrderDoc = self.transport().insert(SALES_ORDER, &body).await?;
        debug!(order = %doc.name, "Created sales order");
        Ok(convert_sales_order(doc))
    }

    // =========================================================================
    // Sales Invoices
    // =========================================================================

    /// A customer's invoices, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the Sales Invoice list cannot be fetched.
    #[instrument(skip(self), fields(customer = %customer))]
    pub async fn list_sales_invoices(
        &self,
        customer: &CustomerId,
        limit: u32,
    ) -> Result<Vec<SalesInvoice>> {
        let query = ListQuery::new()
            .fields(SALES_INVOICE_FIELDS)
            .filter(Filter::eq("customer", customer.as_str()))
            .order_by("posting_date desc, creation desc")
            .limit(limit);

        let docs: Vec<SalesInvoiceDoc> = self.transport().list(SALES_INVOICE, &query).await?;
        Ok(docs.into_iter().map(convert_sales_invoice).collect())
    }

    /// One invoice.
    ///
    /// # Errors
    ///
    /// Returns `ErpError::NotFound` if the invoice does not exist.
    pub async fn get_sales_invoice(&self, name: &str) -> Result<SalesInvoice> {
        let doc: SalesInvoiceDoc = self.transport().get_doc(SALES_INVOICE, name).await?;
        Ok(convert_sales_invoice(doc))
    }

    // =========================================================================
    // Addresses
    // =========================================================================

    /// Addresses linked to a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the Address list cannot be fetched.
    #[instrument(skip(self), fields(customer = %customer))]
    pub async fn list_addresses(&self, customer: &CustomerId) -> Result<Vec<Address>> {
        let query = ListQuery::new()
            .fields(ADDRESS_FIELDS)
            .filter(Filter::eq("link_doctype", CUSTOMER).on(DYNAMIC_LINK))
            .filter(Filter::eq("link_name", customer.as_str()).on(DYNAMIC_LINK))
            .order_by("is_primary_address desc, modified desc")
            .limit(UNLIMITED);

        let docs: Vec<AddressDoc> = self.transport().list(ADDRESS, &query).await?;
        Ok(docs.into_iter().map(convert_address).collect())
    }

    /// Create an address linked to a customer.
    ///
    /// # Errors
    ///
    /// Returns the server's validation error if a mandatory field is
    /// rejected.
    #[instrument(skip(self, address), fields(customer = %customer))]
    pub async fn create_address(
        &self,
        customer: &CustomerId,
        address: &NewAddress,
    ) -> Result<Address> {
        let body = new_address_body(customer, address);
        let doc: AddressDoc = self.transport().insert(ADDRESS, &body).await?;
        Ok(convert_address(doc))
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Customer whose `email_id` is `email`.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than "no such customer".
    pub async fn find_customer_by_email(&self, email: &str) -> Result<Option<CustomerId>> {
        let query = ListQuery::new()
            .fields(&["name"])
            .filter(Filter::eq("email_id", email))
            .limit(1);

        let rows = none_if_missing(self.transport().list::<NamedDoc>(CUSTOMER, &query).await)?;
        Ok(rows
            .and_then(|rows| rows.into_iter().next())
            .map(|row| CustomerId::new(row.name)))
    }

    /// User id (email) of the user with mobile number `phone`.
    ///
    /// # Errors
    ///
    /// Returns an error for failures other than "no such user".
    pub async fn find_email_by_phone(&self, phone: &str) -> Result<Option<String>> {
        let query = ListQuery::new()
            .fields(&["name"])
            .filter(Filter::eq("mobile_no", phone))
            .limit(1);

        let rows = none_if_missing(self.transport().list::<NamedDoc>(USER, &query).await)?;
        Ok(rows
            .and_then(|rows| rows.into_iter().next())
            .map(|row| row.name))
    }
}
