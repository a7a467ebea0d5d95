//! Sales order, invoice and address conversions.

use erp_storefront_core::{CustomerId, ItemCode};
use serde_json::{Map, Value, json};

use crate::docs::{AddressDoc, SalesInvoiceDoc, SalesOrderDoc};
use crate::types::{Address, NewAddress, NewSalesOrder, OrderLine, SalesInvoice, SalesOrder};

pub fn convert_sales_order(doc: SalesOrderDoc) -> SalesOrder {
    SalesOrder {
        id: doc.name,
        customer: CustomerId::new(doc.customer),
        transaction_date: doc.transaction_date,
        delivery_date: doc.delivery_date,
        status: doc.status,
        currency: doc.currency,
        grand_total: doc.grand_total.unwrap_or_default(),
        lines: doc
            .items
            .into_iter()
            .map(|row| OrderLine {
                item_code: ItemCode::new(row.item_code),
                item_name: row.item_name,
                qty: row.qty,
                rate: row.rate.unwrap_or_default(),
                amount: row.amount.unwrap_or_default(),
            })
            .collect(),
    }
}

pub fn convert_sales_invoice(doc: SalesInvoiceDoc) -> SalesInvoice {
    SalesInvoice {
        id: doc.name,
        customer: CustomerId::new(doc.customer),
        posting_date: doc.posting_date,
        due_date: doc.due_date,
        status: doc.status,
        currency: doc.currency,
        grand_total: doc.grand_total.unwrap_or_default(),
        outstanding_amount: doc.outstanding_amount.unwrap_or_default(),
    }
}

pub fn convert_address(doc: AddressDoc) -> Address {
    Address {
        id: doc.name,
        title: doc.address_title,
        address_type: doc.address_type,
        line1: doc.address_line1,
        line2: doc.address_line2,
        city: doc.city,
        state: doc.state,
        postal_code: doc.pincode,
        country: doc.country,
        phone: doc.phone,
        email: doc.email_id,
        is_primary: doc.is_primary_address,
        is_shipping: doc.is_shipping_address,
    }
}

/// Request body for a new Sales Order.
///
/// Every line carries the order's delivery date, which ERPNext requires
/// per row.
pub fn new_sales_order_body(order: &NewSalesOrder, company: Option<&str>) -> Value {
    let delivery_date = order.delivery_date.format("%Y-%m-%d").to_string();

    let items: Vec<Value> = order
        .lines
        .iter()
        .map(|line| {
            let mut row = json!({
                "item_code": line.item_code.as_str(),
                "qty": line.qty,
                "delivery_date": delivery_date,
            });
            if let (Some(rate), Value::Object(map)) = (line.rate, &mut row) {
                map.insert("rate".to_string(), json!(rate));
            }
            row
        })
        .collect();

    let mut body = Map::new();
    body.insert("customer".to_string(), json!(order.customer.as_str()));
    body.insert("delivery_date".to_string(), json!(delivery_date));
    body.insert("items".to_string(), Value::Array(items));
    if let Some(company) = company {
        body.insert("company".to_string(), json!(company));
    }
    Value::Object(body)
}

/// Request body for a new Address linked to `customer`.
pub fn new_address_body(customer: &CustomerId, address: &NewAddress) -> Value {
    json!({
        "address_title": address.title,
        "address_type": address.address_type,
        "address_line1": address.line1,
        "address_line2": address.line2,
        "city": address.city,
        "state": address.state,
        "pincode": address.postal_code,
        "country": address.country,
        "phone": address.phone,
        "email_id": address.email,
        "is_shipping_address": i32::from(address.is_shipping),
        "links": [{
            "link_doctype": "Customer",
            "link_name": customer.as_str(),
        }],
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use erp_storefront_core::SalesOrderStatus;
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::NewOrderLine;

    #[test]
    fn test_order_with_unknown_status() {
        let doc: SalesOrderDoc = serde_json::from_value(json!({
            "name": "SAL-ORD-2024-00012",
            "customer": "Jane Doe",
            "transaction_date": "2024-05-02",
            "status": "Partially Delivered Someday",
            "grand_total": 59.5,
            "items": [{"item_code": "KETTLE-1", "qty": 2.0, "rate": 29.75, "amount": 59.5}],
        }))
        .unwrap();

        let order = convert_sales_order(doc);
        assert_eq!(order.status, SalesOrderStatus::Other);
        assert_eq!(order.grand_total, Decimal::new(595, 1));
        assert_eq!(order.lines.len(), 1);
        assert_eq!(order.lines.first().unwrap().rate, Decimal::new(2975, 2));
    }

    #[test]
    fn test_order_body_copies_delivery_date_to_rows() {
        let order = NewSalesOrder {
            customer: CustomerId::new("Jane Doe"),
            company: None,
            delivery_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            lines: vec![
                NewOrderLine {
                    item_code: ItemCode::new("KETTLE-1"),
                    qty: 1.0,
                    rate: None,
                },
                NewOrderLine {
                    item_code: ItemCode::new("MUG-1"),
                    qty: 4.0,
                    rate: Some(Decimal::new(5, 0)),
                },
            ],
        };

        let body = new_sales_order_body(&order, Some("Wind Power LLC"));
        assert_eq!(body["company"], "Wind Power LLC");
        assert_eq!(body["items"][0]["delivery_date"], "2024-06-01");
        assert!(body["items"][0].get("rate").is_none());
        assert_eq!(body["items"][1]["rate"], "5");
    }

    #[test]
    fn test_address_body_links_customer() {
        let address = NewAddress {
            title: "Home".to_string(),
            address_type: "Shipping".to_string(),
            line1: "1 Main St".to_string(),
            line2: None,
            city: "Springfield".to_string(),
            state: None,
            postal_code: Some("12345".to_string()),
            country: "United States".to_string(),
            phone: None,
            email: None,
            is_shipping: true,
        };

        let body = new_address_body(&CustomerId::new("Jane Doe"), &address);
        assert_eq!(body["links"][0]["link_doctype"], "Customer");
        assert_eq!(body["links"][0]["link_name"], "Jane Doe");
        assert_eq!(body["is_shipping_address"], 1);
        assert_eq!(body["pincode"], "12345");
    }
}
