//! HTTP transport for the Frappe REST API.
//!
//! Two flavours exist and they never share a connection pool:
//! - [`Transport::credential`] injects `Authorization: Basic base64(key:secret)`
//!   into every request via default headers.
//! - [`Transport::session`] carries no authorization header and keeps the
//!   `sid` cookie set by `/api/method/login` in its own cookie store.
//!
//! Every call goes through [`with_retry`]; the response is classified into
//! [`ErpError`] here so callers only ever see one error shape.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};
use url::Url;

use crate::config::ErpConfig;
use crate::error::{ErpError, Result, ServerErrorPayload};
use crate::query::ListQuery;
use crate::retry::{RetryPolicy, with_retry};

/// How requests are authenticated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthMode {
    /// API key/secret Basic auth.
    Credential,
    /// Cookie session established by login.
    Session,
}

#[derive(Clone)]
pub(crate) struct Transport {
    inner: Arc<TransportInner>,
}

struct TransportInner {
    client: reqwest::Client,
    base_url: Url,
    retry: RetryPolicy,
    mode: AuthMode,
}

/// One fully described request, replayable across retries.
struct Call {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    body: Option<Value>,
    label: String,
}

impl Transport {
    /// Transport for service-level calls authenticated with the API key.
    pub(crate) fn credential(config: &ErpConfig) -> Result<Self> {
        let token = STANDARD.encode(config.credential_pair());
        let mut auth = HeaderValue::from_str(&format!("Basic {token}"))
            .map_err(|e| ErpError::Request(format!("invalid authorization header: {e}")))?;
        auth.set_sensitive(true);

        let mut headers = default_headers();
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ErpError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::from_parts(client, config, AuthMode::Credential))
    }

    /// Transport for user-scoped calls authenticated with a session cookie.
    pub(crate) fn session(config: &ErpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .default_headers(default_headers())
            .cookie_store(true)
            .timeout(config.timeout)
            .build()
            .map_err(|e| ErpError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::from_parts(client, config, AuthMode::Session))
    }

    fn from_parts(client: reqwest::Client, config: &ErpConfig, mode: AuthMode) -> Self {
        Self {
            inner: Arc::new(TransportInner {
                client,
                base_url: config.base_url.clone(),
                retry: config.retry,
                mode,
            }),
        }
    }

    #[cfg(test)]
    pub(crate) fn mode(&self) -> AuthMode {
        self.inner.mode
    }

    // =========================================================================
    // Resource Calls
    // =========================================================================

    /// `GET /api/resource/{doctype}` with list parameters.
    pub(crate) async fn list<T: DeserializeOwned>(
        &self,
        doctype: &str,
        query: &ListQuery,
    ) -> Result<Vec<T>> {
        let call = Call {
            method: Method::GET,
            url: self.endpoint(&["api", "resource", doctype]),
            query: query.to_params(doctype),
            body: None,
            label: format!("list {doctype}"),
        };
        let value = self.execute(call).await?;
        decode_envelope(value, "data", &format!("list {doctype}"))
    }

    /// `GET /api/resource/{doctype}/{name}`.
    pub(crate) async fn get_doc<T: DeserializeOwned>(&self, doctype: &str, name: &str) -> Result<T> {
        let call = Call {
            method: Method::GET,
            url: self.endpoint(&["api", "resource", doctype, name]),
            query: Vec::new(),
            body: None,
            label: format!("get {doctype} {name}"),
        };
        let value = self.execute(call).await?;
        decode_envelope(value, "data", &format!("{doctype} {name}"))
    }

    /// `POST /api/resource/{doctype}`.
    pub(crate) async fn insert<T, B>(&self, doctype: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let call = Call {
            method: Method::POST,
            url: self.endpoint(&["api", "resource", doctype]),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
            label: format!("insert {doctype}"),
        };
        let value = self.execute(call).await?;
        decode_envelope(value, "data", &format!("new {doctype}"))
    }

    /// `PUT /api/resource/{doctype}/{name}`.
    pub(crate) async fn update<T, B>(&self, doctype: &str, name: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let call = Call {
            method: Method::PUT,
            url: self.endpoint(&["api", "resource", doctype, name]),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
            label: format!("update {doctype} {name}"),
        };
        let value = self.execute(call).await?;
        decode_envelope(value, "data", &format!("{doctype} {name}"))
    }

    // =========================================================================
    // Method Calls
    // =========================================================================

    /// `GET /api/method/{method}`, returning the `message` envelope.
    pub(crate) async fn call_get<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let call = Call {
            method: Method::GET,
            url: self.endpoint(&["api", "method", method]),
            query: params
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            body: None,
            label: format!("call {method}"),
        };
        let value = self.execute(call).await?;
        decode_envelope(value, "message", method)
    }

    /// `POST /api/method/{method}`, returning the whole response body.
    pub(crate) async fn call_post<B: Serialize + ?Sized>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<Value> {
        let call = Call {
            method: Method::POST,
            url: self.endpoint(&["api", "method", method]),
            query: Vec::new(),
            body: Some(serde_json::to_value(body)?),
            label: format!("call {method}"),
        };
        self.execute(call).await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Base URL with `segments` appended, each percent-encoded on its own.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.inner.base_url.clone();
        // Base URLs that cannot be a base are rejected when the config is built
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn execute(&self, call: Call) -> Result<Value> {
        with_retry(self.inner.retry, &call.label, || self.send_once(&call)).await
    }

    async fn send_once(&self, call: &Call) -> Result<Value> {
        debug!(
            method = %call.method,
            url = %call.url,
            auth = ?self.inner.mode,
            "Sending ERPNext request"
        );

        let mut request = self
            .inner
            .client
            .request(call.method.clone(), call.url.clone());
        if !call.query.is_empty() {
            request = request.query(&call.query);
        }
        if let Some(body) = &call.body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, &body, &call.label));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body).map_err(|e| {
            error!(
                operation = %call.label,
                error = %e,
                body = %excerpt(&body),
                "Failed to parse ERPNext response"
            );
            ErpError::Decode(format!("{}: {e}", call.label))
        })
    }
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn excerpt(body: &str) -> String {
    body.chars().take(500).collect()
}

/// Turn a non-success response into an error.
fn classify_failure(status: StatusCode, body: &str, label: &str) -> ErpError {
    let payload = ServerErrorPayload::parse(body);

    if let Some(exc) = &payload.exc {
        debug!(operation = %label, traceback = %excerpt(exc), "ERPNext traceback");
    }

    if status == StatusCode::NOT_FOUND || payload.is_does_not_exist() {
        return ErpError::NotFound(payload.best_message().unwrap_or_else(|| label.to_string()));
    }

    warn!(
        operation = %label,
        status = %status,
        exc_type = ?payload.exc_type,
        body = %excerpt(body),
        "ERPNext returned non-success status"
    );

    ErpError::Api {
        status: status.as_u16(),
        message: payload.best_message().unwrap_or_default(),
        exc_type: payload.exc_type,
    }
}

/// Pull `key` out of a response object and decode it.
///
/// A missing envelope key is a decode failure, not an empty result.
fn decode_envelope<T: DeserializeOwned>(value: Value, key: &str, what: &str) -> Result<T> {
    let Value::Object(mut map) = value else {
        return Err(ErpError::Decode(format!(
            "{what}: expected a JSON object with '{key}'"
        )));
    };
    let inner = map
        .remove(key)
        .ok_or_else(|| ErpError::Decode(format!("{what}: response has no '{key}'")))?;
    serde_json::from_value(inner).map_err(|e| {
        error!(what, error = %e, "ERPNext document does not match the expected shape");
        ErpError::Decode(format!("{what}: {e}"))
    })
}
