//! Decoding of the simulation backend's `/orderbook` response.
//!
//! The backend answers in one of two shapes:
//!
//! ```jsonc
//! { "orderbook": { /* Orderbook */ } }
//! { "success": true, "error": "", "ts": 1700000000, "data": { /* Orderbook */ } }
//! ```
//!
//! Failures are not always signalled by the HTTP status: the enveloped form
//! is served with `200 OK` and `"success": false`. The body is therefore
//! re-serialized compactly and scanned for a failure marker before anything
//! is decoded.

use corelib::Orderbook;
use serde_json::Value;
use tracing::debug;

use super::errors::FetchError;
use super::schema::validate_orderbook;

/// Substring that marks a backend-side failure in a compact JSON body.
pub const DEFAULT_FAILURE_MARKER: &str = r#""success":false"#;

/// Turn a raw HTTP response into a validated [`Orderbook`].
///
/// Order of checks: status, failure marker, JSON shape, schema.
pub fn parse_orderbook_response(
    status: u16,
    body: &str,
    failure_marker: &str,
) -> Result<Orderbook, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }

    let json: Value = match serde_json::from_str(body) {
        Ok(v) => v,
        Err(e) => {
            if !failure_marker.is_empty() && body.contains(failure_marker) {
                return Err(FetchError::BackendFailure(truncate(body)));
            }
            return Err(FetchError::Malformed(format!("body is not json: {e}")));
        }
    };

    let compact = json.to_string();
    if !failure_marker.is_empty() && compact.contains(failure_marker) {
        let reason = json
            .get("error")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("failure marker {failure_marker} found in response"));
        return Err(FetchError::BackendFailure(reason));
    }

    let payload = extract_payload(json)?;

    let orderbook: Orderbook = serde_json::from_value(payload)
        .map_err(|e| FetchError::Malformed(format!("orderbook does not match schema: {e}")))?;

    debug!(
        trades0to1 = orderbook.trades0to1.len(),
        trades1to0 = orderbook.trades1to0.len(),
        pools = orderbook.pools.len(),
        "orderbook payload decoded"
    );

    validate_orderbook(orderbook)
}

fn extract_payload(mut json: Value) -> Result<Value, FetchError> {
    let Some(obj) = json.as_object_mut() else {
        return Err(FetchError::Malformed("body is not a json object".into()));
    };

    for key in ["orderbook", "data"] {
        match obj.remove(key) {
            Some(Value::Null) | None => continue,
            Some(v) => return Ok(v),
        }
    }

    Err(FetchError::Malformed("missing `orderbook` field".into()))
}

fn truncate(s: &str) -> String {
    const MAX: usize = 200;
    match s.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}
