use crate::api::privacy::PrivacyFilter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Outbound request as the caller describes it. `url` may be relative to the
/// client's base URL. Headers are a sorted map so cache keys are
/// deterministic regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    /// Caller opt-out from the response cache for this request.
    #[serde(default)]
    pub skip_cache: bool,
    /// Per-request privacy filters, applied on top of the client's configured
    /// mode.
    #[serde(default)]
    pub privacy: Vec<PrivacyFilter>,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
            skip_cache: false,
            privacy: Vec::new(),
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: BTreeMap::new(),
            body: Some(body),
            skip_cache: false,
            privacy: Vec::new(),
        }
    }
}

/// Response handed back to callers. `cached` marks cache short-circuits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub data: Value,
    #[serde(default)]
    pub cached: bool,
}
