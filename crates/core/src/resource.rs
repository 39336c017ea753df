//! Request and response values exchanged between the host, the cache and the network.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// Body of the synthetic response served when neither cache nor network can answer.
pub const OFFLINE_BODY: &str = "Offline";

/// Status of the synthetic offline response.
pub const OFFLINE_STATUS: u16 = 503;

/// An outgoing request issued by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub url: Url,
}

impl Request {
    /// Build a GET request.
    pub fn get(url: Url) -> Self {
        Self { method: "GET".into(), url }
    }

    /// Build a request with an arbitrary method.
    pub fn new(method: impl Into<String>, url: Url) -> Self {
        Self { method: method.into(), url }
    }

    /// Only GET requests are eligible for caching.
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// Normalized cache key for this request.
    pub fn key(&self) -> RequestKey {
        RequestKey::new(&self.method, &self.url)
    }
}

/// Normalized request identity: upper-cased method plus URL without fragment.
///
/// Keys order by URL, then method.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: String,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self { method: method.to_ascii_uppercase(), url: url.into() }
    }

    /// Content-addressed hash used as the storage key.
    pub fn hash(&self) -> String {
        crate::cache::hash::compute_cache_key(&self.method, &self.url)
    }
}

impl Ord for RequestKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.url.cmp(&other.url).then_with(|| self.method.cmp(&other.method))
    }
}

impl PartialOrd for RequestKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// A response snapshot: status, headers and the full body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Response {
    pub fn new(status: u16, headers: Vec<(String, String)>, body: impl Into<Bytes>) -> Self {
        Self { status, headers, body: body.into() }
    }

    /// The synthetic response returned when a resource is unavailable offline.
    pub fn offline() -> Self {
        Self {
            status: OFFLINE_STATUS,
            headers: vec![("content-type".into(), "text/plain; charset=utf-8".into())],
            body: Bytes::from_static(OFFLINE_BODY.as_bytes()),
        }
    }

    /// True for 2xx statuses, the only ones ever written to the cache.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
