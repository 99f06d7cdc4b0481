use crate::api::types::{ApiRequest, ApiResponse};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;
use tracing::debug;

/// Deterministic cache key over everything that identifies a request. Header
/// ordering is already canonical (`BTreeMap`), and md5 gives a real digest
/// rather than an unbounded concatenation.
pub fn cache_key(request: &ApiRequest) -> String {
    let body = request
        .body
        .as_ref()
        .map(|b| b.to_string())
        .unwrap_or_default();
    let headers = request
        .headers
        .iter()
        .map(|(k, v)| format!("{k}:{v}"))
        .collect::<Vec<_>>()
        .join(";");
    let material = format!("{}|{}|{}|{}", request.method, request.url, body, headers);
    format!("{:x}", md5::compute(material.as_bytes()))
}

#[derive(Debug, Clone)]
struct CacheEntry {
    response: ApiResponse,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let age = now.signed_duration_since(self.stored_at);
        age >= chrono::Duration::from_std(self.ttl).unwrap_or_default()
    }
}

/// TTL response cache. Expired entries are evicted lazily on read, plus an
/// opportunistic prune whenever an insert pushes the map past its size limit.
pub struct ResponseCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
    max_entries: usize,
}

impl ResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<ApiResponse> {
        let now = Utc::now();
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => {
                let mut response = entry.response.clone();
                response.cached = true;
                return Some(response);
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    pub fn put(&self, key: String, response: &ApiResponse) {
        self.entries.insert(
            key,
            CacheEntry {
                response: ApiResponse {
                    cached: false,
                    ..response.clone()
                },
                stored_at: Utc::now(),
                ttl: self.ttl,
            },
        );
        if self.entries.len() > self.max_entries {
            self.prune();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Drop expired entries first; if the cache is still over its limit,
    /// drop the oldest entries.
    fn prune(&self) {
        let now = Utc::now();
        self.entries.retain(|_, entry| !entry.is_expired(now));

        while self.entries.len() > self.max_entries {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.stored_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(key) => {
                    debug!(key, "evicting oldest cache entry");
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn response(data: serde_json::Value) -> ApiResponse {
        ApiResponse {
            status: 200,
            headers: BTreeMap::new(),
            data,
            cached: false,
        }
    }

    #[test]
    fn test_key_is_deterministic_and_sensitive() {
        let a = ApiRequest::post("/check", json!({"claim": "x"}));
        let b = ApiRequest::post("/check", json!({"claim": "x"}));
        let c = ApiRequest::post("/check", json!({"claim": "y"}));
        assert_eq!(cache_key(&a), cache_key(&b));
        assert_ne!(cache_key(&a), cache_key(&c));

        let mut d = a.clone();
        d.method = "GET".to_string();
        assert_ne!(cache_key(&a), cache_key(&d));
    }

    #[test]
    fn test_header_order_does_not_matter() {
        let mut a = ApiRequest::get("/x");
        a.headers.insert("b".into(), "2".into());
        a.headers.insert("a".into(), "1".into());
        let mut b = ApiRequest::get("/x");
        b.headers.insert("a".into(), "1".into());
        b.headers.insert("b".into(), "2".into());
        assert_eq!(cache_key(&a), cache_key(&b));
    }

    #[test]
    fn test_hit_marks_cached() {
        let cache = ResponseCache::new(Duration::from_secs(60), 10);
        cache.put("k".into(), &response(json!(1)));
        let hit = cache.get("k").unwrap();
        assert!(hit.cached);
        assert_eq!(hit.data, json!(1));
    }

    #[test]
    fn test_expired_entries_evicted_on_read() {
        let cache = ResponseCache::new(Duration::ZERO, 10);
        cache.put("k".into(), &response(json!(1)));
        assert!(cache.get("k").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_size_threshold_prunes_oldest() {
        let cache = ResponseCache::new(Duration::from_secs(60), 3);
        for i in 0..5 {
            cache.put(format!("k{i}"), &response(json!(i)));
        }
        assert!(cache.len() <= 3);
        // Newest entry always survives.
        assert!(cache.get("k4").is_some());
    }
}
