//! CRM HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the two
//! calls a reconciliation run makes: filtered object search by key
//! property, and batch association create.
//!
//! No retries. A failed call is reported once and the engine degrades the
//! affected rows.

use std::time::Duration;

use serde_json::{json, Value};

use crmsync_recon::error::LookupError;
use crmsync_recon::model::{FoundObject, ItemResult, ResolvedOp, WriteResponse};
use crmsync_recon::resolve::KeyLookup;
use crmsync_recon::submit::{AssociationKind, BatchWriter};

use crate::auth::{resolve_credentials, Credentials};

const HTTP_TIMEOUT: Duration = Duration::from_secs(60);
const USER_AGENT: &str = concat!("crmsync/", env!("CARGO_PKG_VERSION"));

/// CRM API client (blocking).
#[derive(Clone)]
pub struct HubClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

/// Error type for client setup.
#[derive(Debug)]
pub enum HubError {
    /// No token from flag, environment, or saved file
    NotAuthenticated,
    /// HTTP client could not be built
    Setup(String),
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HubError::NotAuthenticated => write!(
                f,
                "not authenticated: pass --token or set {}",
                crate::auth::TOKEN_ENV
            ),
            HubError::Setup(msg) => write!(f, "HTTP client setup failed: {}", msg),
        }
    }
}

impl std::error::Error for HubError {}

impl HubClient {
    /// Create a client from flags, environment, and saved credentials.
    pub fn from_env(token_flag: Option<&str>, api_base_flag: Option<&str>) -> Result<Self, HubError> {
        Self::new(resolve_credentials(token_flag, api_base_flag)?)
    }

    /// Create a client with explicit credentials.
    pub fn new(creds: Credentials) -> Result<Self, HubError> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| HubError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            api_base: creds.api_base.trim_end_matches('/').to_string(),
            token: creds.token,
        })
    }

    /// Point an existing token at another API root (tests, sandboxes).
    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, HubError> {
        Self::new(Credentials::new(token, base_url))
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn post_json(&self, url: &str, body: &Value) -> reqwest::Result<reqwest::blocking::Response> {
        self.http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Body for `POST /crm/v3/objects/{type}/search` with a single IN filter.
/// `after` is the cursor from the previous page's `paging.next.after`.
pub fn search_body(property: &str, values: &[String], limit: usize, after: Option<&str>) -> Value {
    let mut body = json!({
        "filterGroups": [{
            "filters": [{
                "propertyName": property,
                "operator": "IN",
                "values": values,
            }]
        }],
        "properties": [property],
        "limit": limit,
    });
    if let Some(after) = after {
        body["after"] = json!(after);
    }
    body
}

/// Cursor for the next result page, absent on the last page.
pub fn next_page_after(body: &Value) -> Option<String> {
    scalar_string(&body["paging"]["next"]["after"])
}

/// Extract `(id, key)` pairs from a search response.
pub fn parse_search_results(body: &Value, property: &str) -> Vec<FoundObject> {
    let Some(results) = body["results"].as_array() else {
        return Vec::new();
    };
    results
        .iter()
        .filter_map(|r| {
            let id = scalar_string(&r["id"])?;
            let key = scalar_string(&r["properties"][property]);
            Some(FoundObject { id, key })
        })
        .collect()
}

impl HubClient {
    fn search_page(&self, url: &str, body: &Value) -> Result<Value, LookupError> {
        let resp = self.post_json(url, body).map_err(|e| LookupError::network(e.to_string()))?;

        let status = resp.status().as_u16();
        let text = resp.text().unwrap_or_default();
        if status != 200 {
            return Err(LookupError::http(status, error_message(&text)));
        }

        serde_json::from_str(&text)
            .map_err(|e| LookupError { status: Some(status), message: format!("unparseable search response: {e}") })
    }
}

/// Several objects may carry the same key, so one value set can match more
/// than `limit` objects. Every page is followed until `paging` is absent.
impl KeyLookup for HubClient {
    fn search(
        &self,
        object_type: &str,
        property: &str,
        values: &[String],
        limit: usize,
    ) -> Result<Vec<FoundObject>, LookupError> {
        let url = format!("{}/crm/v3/objects/{}/search", self.api_base, object_type);
        let mut found = Vec::new();
        let mut after: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let body = self.search_page(&url, &search_body(property, values, limit, after.as_deref()))?;
            pages += 1;
            found.extend(parse_search_results(&body, property));

            match next_page_after(&body) {
                None => break,
                Some(next) if after.as_deref() == Some(next.as_str()) => {
                    return Err(LookupError {
                        status: Some(200),
                        message: format!("search paging cursor did not advance past '{next}'"),
                    });
                }
                Some(next) => after = Some(next),
            }
        }

        log::debug!(
            "search {object_type}.{property}: {} values, {} objects in {pages} page(s)",
            values.len(),
            found.len()
        );
        Ok(found)
    }
}

// ---------------------------------------------------------------------------
// Batch association create
// ---------------------------------------------------------------------------

/// Body for `POST /crm/v4/associations/{from}/{to}/batch/create`.
pub fn association_body(kind: &AssociationKind, ops: &[ResolvedOp]) -> Value {
    let inputs: Vec<Value> = ops
        .iter()
        .map(|op| {
            json!({
                "from": { "id": op.left_id },
                "to": { "id": op.right_id },
                "types": [{
                    "associationCategory": kind.category,
                    "associationTypeId": kind.type_id,
                }],
            })
        })
        .collect();
    json!({ "inputs": inputs })
}

/// Per-item entries of a 207 body, in submission order.
pub fn parse_multi_status(body: &Value) -> Vec<ItemResult> {
    let Some(results) = body["results"].as_array() else {
        return Vec::new();
    };
    results
        .iter()
        .map(|r| ItemResult {
            id: scalar_string(&r["id"]),
            status: r["status"].as_str().map(String::from),
        })
        .collect()
}

/// Classify a raw batch response. 207 is per-item; any other 2xx is a
/// whole-batch success.
pub fn interpret_write(status: u16, text: &str) -> WriteResponse {
    match status {
        207 => {
            let body: Value = serde_json::from_str(text).unwrap_or(Value::Null);
            WriteResponse::MultiStatus(parse_multi_status(&body))
        }
        200..=299 => WriteResponse::Success,
        _ => WriteResponse::Failure { status: Some(status), body: error_message(text) },
    }
}

impl BatchWriter for HubClient {
    fn write_batch(&self, kind: &AssociationKind, ops: &[ResolvedOp]) -> WriteResponse {
        let url = format!(
            "{}/crm/v4/associations/{}/{}/batch/create",
            self.api_base, kind.from_object_type, kind.to_object_type
        );
        match self.post_json(&url, &association_body(kind, ops)) {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let text = resp.text().unwrap_or_default();
                interpret_write(status, &text)
            }
            Err(e) => WriteResponse::Failure { status: None, body: e.to_string() },
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Ids and property values arrive as strings or numbers.
fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Prefer the API's `message` field; otherwise the raw body.
fn error_message(text: &str) -> String {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|v| v["message"].as_str().map(String::from))
        .unwrap_or_else(|| text.trim().to_string())
}
