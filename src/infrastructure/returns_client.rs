use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::{json, Map, Value};

use crate::config::ApiCredentials;
use crate::domain::errors::{DomainError, Operation};
use crate::domain::ports::ReturnsApi;
use crate::domain::returns::{CustomerReturn, ItemId};

/// Everything `encodeURIComponent` escapes.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub const PAGE_SIZE: u32 = 50;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<reqwest::Error> for DomainError {
    fn from(e: reqwest::Error) -> Self {
        DomainError::Network(e.to_string())
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

pub struct HttpReturnsApi {
    client: Client,
    base_url: String,
    authorization: String,
}

impl HttpReturnsApi {
    pub fn new(base_url: impl Into<String>, credentials: &ApiCredentials) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            authorization: credentials.authorization(),
        }
    }

    pub fn search_url(&self, query: &str) -> String {
        format!(
            "{}/v1/customer_returns?s={}&page=1&per_page={}",
            self.base_url,
            utf8_percent_encode(query, URI_COMPONENT),
            PAGE_SIZE
        )
    }

    pub fn item_url(&self, id: &ItemId) -> String {
        format!(
            "{}/v1/items/{}",
            self.base_url,
            utf8_percent_encode(&id.to_string(), URI_COMPONENT)
        )
    }
}

impl ReturnsApi for HttpReturnsApi {
    async fn search_returns(&self, query: &str) -> Result<Vec<CustomerReturn>, DomainError> {
        let url = self.search_url(query);
        log::debug!("GET {}", url);

        let resp = self
            .client
            .get(&url)
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DomainError::Http {
                operation: Operation::Lookup,
                status: status.as_u16(),
            });
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| DomainError::InvalidResponse(e.to_string()))?;
        first_return(body)
    }

    async fn mark_inspected(&self, id: &ItemId) -> Result<Option<Map<String, Value>>, DomainError> {
        let url = self.item_url(id);
        log::debug!("PUT {}", url);

        // `.json` also sets `Content-Type: application/json`.
        let resp = self
            .client
            .put(&url)
            .header(AUTHORIZATION, &self.authorization)
            .header(ACCEPT, "application/json")
            .json(&json!({ "is_inspected": true }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DomainError::Http {
                operation: Operation::Update,
                status: status.as_u16(),
            });
        }

        // An unreadable or non-object body still counts as success.
        let patch = match resp.bytes().await {
            Ok(bytes) => match serde_json::from_slice::<Value>(&bytes) {
                Ok(Value::Object(fields)) => Some(fields),
                _ => None,
            },
            Err(e) => {
                log::debug!("Ignoring unreadable update response for item {}: {}", id, e);
                None
            }
        };
        Ok(patch)
    }
}

/// Decode only the first entry of `customer_returns`. A missing or non-array
/// field is treated as no match.
fn first_return(mut body: Value) -> Result<Vec<CustomerReturn>, DomainError> {
    let first = match body.get_mut("customer_returns") {
        Some(Value::Array(returns)) if !returns.is_empty() => returns.swap_remove(0),
        _ => return Ok(Vec::new()),
    };
    let customer_return = serde_json::from_value(first)
        .map_err(|e| DomainError::InvalidResponse(e.to_string()))?;
    Ok(vec![customer_return])
}
