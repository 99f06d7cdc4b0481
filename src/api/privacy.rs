use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Independent, composable redaction filters applied to the *outgoing* body
/// only. Response data is never touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrivacyFilter {
    /// Reduce URL fields to their hostname and strip content/user/session
    /// identifiers.
    DomainOnly,
    /// Keep only an allow-list of fields.
    MinimizeData,
    /// Strip network-identity fields.
    Anonymize,
}

const URL_FIELDS: &[&str] = &["url", "link", "href", "page_url", "pageUrl"];
const DOMAIN_ONLY_STRIPPED: &[&str] = &[
    "content", "userId", "user_id", "sessionId", "session_id", "userAgent", "user_agent",
];
const MINIMIZE_ALLOWED: &[&str] = &["url", "domain", "title", "language", "text"];
const ANONYMIZE_STRIPPED: &[&str] = &[
    "ip", "userAgent", "user_agent", "referrer", "referer",
];

/// Apply filters in order to a JSON object body. Non-object bodies pass
/// through untouched; there is nothing field-level to redact in them.
pub fn apply_filters(body: &mut Value, filters: &[PrivacyFilter]) {
    let Some(map) = body.as_object_mut() else {
        return;
    };

    for filter in filters {
        match filter {
            PrivacyFilter::DomainOnly => {
                for field in URL_FIELDS {
                    if let Some(value) = map.get_mut(*field) {
                        if let Some(reduced) = reduce_to_host(value) {
                            *value = Value::String(reduced);
                        }
                    }
                }
                for field in DOMAIN_ONLY_STRIPPED {
                    map.remove(*field);
                }
            }
            PrivacyFilter::MinimizeData => {
                map.retain(|key, _| MINIMIZE_ALLOWED.contains(&key.as_str()));
            }
            PrivacyFilter::Anonymize => {
                for field in ANONYMIZE_STRIPPED {
                    map.remove(*field);
                }
            }
        }
    }
}

fn reduce_to_host(value: &Value) -> Option<String> {
    let raw = value.as_str()?;
    let url = Url::parse(raw).ok()?;
    url.host_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_domain_only_reduces_urls_and_strips_identity() {
        let mut body = json!({
            "url": "https://example.com/private/path?token=abc",
            "content": "full page text",
            "userId": "u-123",
            "sessionId": "s-456",
            "userAgent": "Mozilla/5.0",
            "title": "kept"
        });
        apply_filters(&mut body, &[PrivacyFilter::DomainOnly]);
        assert_eq!(body["url"], "example.com");
        assert!(body.get("content").is_none());
        assert!(body.get("userId").is_none());
        assert!(body.get("sessionId").is_none());
        assert!(body.get("userAgent").is_none());
        assert_eq!(body["title"], "kept");
    }

    #[test]
    fn test_minimize_keeps_only_allowlist() {
        let mut body = json!({
            "url": "https://example.com",
            "domain": "example.com",
            "title": "t",
            "language": "en",
            "text": "body",
            "secret": "x",
            "userId": "u"
        });
        apply_filters(&mut body, &[PrivacyFilter::MinimizeData]);
        let map = body.as_object().unwrap();
        assert_eq!(map.len(), 5);
        assert!(map.keys().all(|k| MINIMIZE_ALLOWED.contains(&k.as_str())));
    }

    #[test]
    fn test_anonymize_strips_network_identity() {
        let mut body = json!({
            "ip": "203.0.113.9",
            "userAgent": "UA",
            "referrer": "https://referrer.example",
            "text": "kept"
        });
        apply_filters(&mut body, &[PrivacyFilter::Anonymize]);
        assert!(body.get("ip").is_none());
        assert!(body.get("userAgent").is_none());
        assert!(body.get("referrer").is_none());
        assert_eq!(body["text"], "kept");
    }

    #[test]
    fn test_filters_compose() {
        let mut body = json!({
            "url": "https://example.com/path",
            "ip": "203.0.113.9",
            "text": "kept",
            "extra": "dropped"
        });
        apply_filters(
            &mut body,
            &[PrivacyFilter::DomainOnly, PrivacyFilter::MinimizeData, PrivacyFilter::Anonymize],
        );
        assert_eq!(body["url"], "example.com");
        assert_eq!(body["text"], "kept");
        assert!(body.get("extra").is_none());
        assert!(body.get("ip").is_none());
    }

    #[test]
    fn test_unparseable_url_field_left_alone() {
        let mut body = json!({"url": "not a url"});
        apply_filters(&mut body, &[PrivacyFilter::DomainOnly]);
        assert_eq!(body["url"], "not a url");
    }
}
