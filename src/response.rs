//! Response shaping shared by every tool
//!
//! All successful tool payloads carry the upstream `provider` name and a
//! `search_timestamp` so agents can reason about data freshness.

use chrono::Utc;
use serde_json::Value;

/// RFC 3339 wall-clock timestamp used in every tool response.
#[must_use]
pub fn current_timestamp() -> String {
    Utc::now().to_rfc3339()
}

/// Return a copy of `body` with `provider` and `search_timestamp` inserted.
///
/// The input is never mutated; existing fields with the same names are
/// overwritten in the copy. Non-object bodies are wrapped under `data`.
#[must_use]
pub fn with_search_metadata(body: &Value, provider: &str) -> Value {
    let mut map = match body {
        Value::Object(map) => map.clone(),
        other => {
            let mut map = serde_json::Map::new();
            map.insert("data".to_string(), other.clone());
            map
        }
    };
    map.insert("provider".to_string(), Value::String(provider.to_string()));
    map.insert(
        "search_timestamp".to_string(),
        Value::String(current_timestamp()),
    );
    Value::Object(map)
}

/// Redact API credentials from a URL before it reaches any log line.
///
/// Covers both credential placements used by our providers: the
/// ExchangeRate-API path segment (`/v6/<key>/...`) and `api_key=` query
/// values. URLs without credentials pass through unchanged.
#[must_use]
pub fn sanitize_url_for_logging(url: &str) -> String {
    let mut sanitized = redact_path_key(url);
    if let Some(start) = sanitized.find("api_key=") {
        let value_start = start + "api_key=".len();
        let value_end = sanitized[value_start..]
            .find('&')
            .map_or(sanitized.len(), |i| value_start + i);
        sanitized.replace_range(value_start..value_end, "[REDACTED]");
    }
    sanitized
}

/// Replace the path segment following `/v6/` when it looks like a key.
fn redact_path_key(url: &str) -> String {
    let Some(start) = url.find("/v6/") else {
        return url.to_string();
    };
    let key_start = start + "/v6/".len();
    let key_end = url[key_start..]
        .find('/')
        .map_or(url.len(), |i| key_start + i);
    let segment = &url[key_start..key_end];
    let looks_like_key = segment.len() >= 8 && segment.chars().all(|c| c.is_ascii_alphanumeric());
    if looks_like_key {
        let mut out = url.to_string();
        out.replace_range(key_start..key_end, "[REDACTED]");
        out
    } else {
        url.to_string()
    }
}
