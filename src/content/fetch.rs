use std::cell::RefCell;
use std::time::Duration;

use crate::foundation::error::{ZonecastError, ZonecastResult};

/// User agent sent by [`HttpFetcher`] when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("zonecast/", env!("CARGO_PKG_VERSION"));

/// A completed upstream response.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP status code.
    pub status: u16,
    /// `Content-Type` header, when present.
    pub content_type: Option<String>,
    /// Response body decoded as text.
    pub body: String,
}

impl FetchResponse {
    /// A `200` response with the given content type and body.
    pub fn ok(content_type: &str, body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: Some(content_type.to_string()),
            body: body.into(),
        }
    }

    /// An empty response with `status`.
    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: String::new(),
        }
    }

    /// `2xx` status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Plain request/response GET.
///
/// `Err` means the source was unreachable; a reachable source answering with an error status is
/// an `Ok` response with that status.
pub trait Fetcher {
    /// Issue a GET for `url`.
    fn get(&self, url: &str) -> ZonecastResult<FetchResponse>;
}

/// GET `url` and return the body, mapping non-success statuses to [`ZonecastError::Fetch`].
pub fn fetch_text(fetcher: &dyn Fetcher, url: &str) -> ZonecastResult<String> {
    let resp = fetcher.get(url)?;
    if !resp.is_success() {
        return Err(ZonecastError::fetch(format!("HTTP {}", resp.status)));
    }
    Ok(resp.body)
}

/// Blocking HTTP client with a bounded timeout.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Build a client that gives up after `timeout`.
    pub fn new(timeout: Duration, user_agent: &str) -> ZonecastResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ZonecastError::fetch(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[tracing::instrument(skip(self))]
    fn get(&self, url: &str) -> ZonecastResult<FetchResponse> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| ZonecastError::fetch(format!("{url}: {e}")))?;
        let status = resp.status().as_u16();
        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp
            .text()
            .map_err(|e| ZonecastError::fetch(format!("{url}: reading body: {e}")))?;
        Ok(FetchResponse {
            status,
            content_type,
            body,
        })
    }
}

/// Routes every request through a relay at `{base}?url={encoded target}`.
pub struct ProxyFetcher<F> {
    base: url::Url,
    inner: F,
}

impl<F: Fetcher> ProxyFetcher<F> {
    /// Wrap `inner`, sending requests to the relay at `base`.
    pub fn new(base: &str, inner: F) -> ZonecastResult<Self> {
        let base = url::Url::parse(base)
            .map_err(|e| ZonecastError::validation(format!("proxy base '{base}': {e}")))?;
        Ok(Self { base, inner })
    }

    /// The relay URL for `target`.
    pub fn proxied_url(&self, target: &str) -> String {
        proxied_url(&self.base, target)
    }
}

/// `{base}?url={encoded target}`.
pub fn proxied_url(base: &url::Url, target: &str) -> String {
    let mut u = base.clone();
    u.query_pairs_mut().append_pair("url", target);
    u.into()
}

impl<F: Fetcher> Fetcher for ProxyFetcher<F> {
    fn get(&self, url: &str) -> ZonecastResult<FetchResponse> {
        self.inner.get(&self.proxied_url(url))
    }
}

/// Scripted reply for [`ScriptedFetcher`].
#[derive(Clone, Debug)]
pub enum Reply {
    /// Answer with this response.
    Respond(FetchResponse),
    /// Fail as if the host were unreachable.
    Unreachable,
}

/// Offline [`Fetcher`] answering from a prefix-matched script and recording every request.
///
/// Later routes shadow earlier ones with a matching prefix. Unmatched URLs are unreachable.
#[derive(Default)]
pub struct ScriptedFetcher {
    routes: RefCell<Vec<(String, Reply)>>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedFetcher {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer URLs starting with `prefix` with `reply`.
    pub fn route(&self, prefix: impl Into<String>, reply: Reply) {
        self.routes.borrow_mut().push((prefix.into(), reply));
    }

    /// Shorthand for a `200` route.
    pub fn respond(&self, prefix: impl Into<String>, content_type: &str, body: impl Into<String>) {
        self.route(prefix, Reply::Respond(FetchResponse::ok(content_type, body)));
    }

    /// Every URL requested so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Requests whose URL starts with `prefix`.
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|u| u.starts_with(prefix))
            .count()
    }
}

impl Fetcher for ScriptedFetcher {
    fn get(&self, url: &str) -> ZonecastResult<FetchResponse> {
        self.calls.borrow_mut().push(url.to_string());
        let routes = self.routes.borrow();
        match routes.iter().rev().find(|(p, _)| url.starts_with(p.as_str())) {
            Some((_, Reply::Respond(resp))) => Ok(resp.clone()),
            Some((_, Reply::Unreachable)) | None => {
                Err(ZonecastError::fetch(format!("{url}: unreachable")))
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/content/fetch.rs"]
mod tests;
