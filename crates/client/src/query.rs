//! List query parameters for `/api/resource/{Doctype}`.
//!
//! Frappe takes `fields`, `filters` and `or_filters` as JSON-encoded arrays
//! in the query string. Filters are encoded as
//! `[doctype, field, operator, value]`; a filter that does not name a
//! doctype is encoded against the doctype being listed.

use serde_json::{Value, json};

/// `limit_page_length` value that asks Frappe for every matching row.
pub const UNLIMITED: u32 = 0;

/// Filter operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Like,
    In,
}

impl Operator {
    /// Operator as Frappe spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Like => "like",
            Self::In => "in",
        }
    }
}

/// One filter condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    doctype: Option<String>,
    field: String,
    operator: Operator,
    value: Value,
}

impl Filter {
    /// Create a filter on the listed doctype.
    #[must_use]
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            doctype: None,
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    /// `field = value`
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::Eq, value)
    }

    /// `field like %text%` (case-insensitive on MariaDB/Postgres collations).
    #[must_use]
    pub fn contains(field: impl Into<String>, text: &str) -> Self {
        Self::new(field, Operator::Like, format!("%{text}%"))
    }

    /// `field in (values...)`
    #[must_use]
    pub fn is_in<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<Value> = values.into_iter().map(|v| Value::String(v.into())).collect();
        Self::new(field, Operator::In, Value::Array(values))
    }

    /// Apply the filter to a child table (or another joined doctype).
    #[must_use]
    pub fn on(mut self, doctype: impl Into<String>) -> Self {
        self.doctype = Some(doctype.into());
        self
    }

    fn encode(&self, listed_doctype: &str) -> Value {
        json!([
            self.doctype.as_deref().unwrap_or(listed_doctype),
            self.field,
            self.operator.as_str(),
            self.value,
        ])
    }
}

/// Parameters for a list call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    fields: Vec<String>,
    filters: Vec<Filter>,
    or_filters: Vec<Filter>,
    limit: Option<u32>,
    offset: Option<u32>,
    order_by: Option<String>,
}

impl ListQuery {
    /// Empty query: Frappe returns `name` only, first page.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields to return.
    #[must_use]
    pub fn fields(mut self, fields: &[&str]) -> Self {
        self.fields = fields.iter().map(ToString::to_string).collect();
        self
    }

    /// Add a filter (all filters must match).
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Add several filters.
    #[must_use]
    pub fn filters(mut self, filters: impl IntoIterator<Item = Filter>) -> Self {
        self.filters.extend(filters);
        self
    }

    /// Add an alternative filter (at least one must match).
    #[must_use]
    pub fn or_filter(mut self, filter: Filter) -> Self {
        self.or_filters.push(filter);
        self
    }

    /// Page size. [`UNLIMITED`] returns every row.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rows to skip.
    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// SQL-style ordering, e.g. `modified desc`.
    #[must_use]
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Encode as query-string pairs for a list of `doctype`.
    #[must_use]
    pub fn to_params(&self, doctype: &str) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !self.fields.is_empty() {
            params.push(("fields".to_string(), json!(self.fields).to_string()));
        }
        if !self.filters.is_empty() {
            params.push(("filters".to_string(), encode_filters(&self.filters, doctype)));
        }
        if !self.or_filters.is_empty() {
            params.push((
                "or_filters".to_string(),
                encode_filters(&self.or_filters, doctype),
            ));
        }
        if let Some(limit) = self.limit {
            params.push(("limit_page_length".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("limit_start".to_string(), offset.to_string()));
        }
        if let Some(order_by) = &self.order_by {
            params.push(("order_by".to_string(), order_by.clone()));
        }

        params
    }
}

fn encode_filters(filters: &[Filter], doctype: &str) -> String {
    Value::Array(filters.iter().map(|f| f.encode(doctype)).collect()).to_string()
}
