use crate::content::fetch::Fetcher;

/// User agent the relay presents upstream.
pub const RELAY_USER_AGENT: &str = "zonecast-proxy/1.0";

/// CORS headers attached to every relay answer.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// What the relay answers to a caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelayResponse {
    /// HTTP status.
    pub status: u16,
    /// `Content-Type` of `body`.
    pub content_type: String,
    /// Response body.
    pub body: String,
}

impl RelayResponse {
    fn json_error(status: u16, message: &str) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: serde_json::json!({ "error": message }).to_string(),
        }
    }

    /// Headers to send with this response, CORS included.
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut out = vec![("Content-Type".to_string(), self.content_type.clone())];
        out.extend(
            CORS_HEADERS
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string())),
        );
        out
    }
}

/// Relay a GET for the `url` query parameter through `upstream`.
///
/// A missing or unparsable target is a `400`. An upstream error status is passed through with a
/// JSON error body. Success returns the upstream body and content type verbatim, defaulting the
/// content type to `text/plain`. An unreachable upstream is a `500`.
#[tracing::instrument(skip(upstream))]
pub fn relay(query_url: Option<&str>, upstream: &dyn Fetcher) -> RelayResponse {
    let Some(target) = query_url.filter(|t| !t.is_empty()) else {
        return RelayResponse::json_error(400, "Missing 'url' parameter");
    };
    if url::Url::parse(target).is_err() {
        return RelayResponse::json_error(400, "Invalid URL");
    }

    match upstream.get(target) {
        Ok(resp) if !resp.is_success() => {
            RelayResponse::json_error(resp.status, &format!("HTTP {}", resp.status))
        }
        Ok(resp) => RelayResponse {
            status: 200,
            content_type: resp
                .content_type
                .unwrap_or_else(|| "text/plain".to_string()),
            body: resp.body,
        },
        Err(e) => {
            tracing::warn!(error = %e, "relay upstream failed");
            RelayResponse::json_error(500, &e.to_string())
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/proxy.rs"]
mod tests;
