//! Request classification.

use serde::{Deserialize, Serialize};
use url::Url;

/// Extensions served network-first, like the root document.
const DOCUMENT_EXTENSIONS: &[&str] = &[".html", ".htm"];

/// Extensions served cache-first.
const ASSET_EXTENSIONS: &[&str] = &[".css", ".js", ".mjs"];

/// How a request is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Serve from cache; fetch and store only on a miss.
    CacheFirst,
    /// Fetch and store; fall back to the cache when the network fails.
    NetworkFirst,
    /// Serve the cached copy at once and refresh it in the background.
    StaleWhileRevalidate,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::CacheFirst => "cache-first",
            Strategy::NetworkFirst => "network-first",
            Strategy::StaleWhileRevalidate => "stale-while-revalidate",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pick a strategy for a URL. First match wins:
///
/// 1. `/` or a document extension: network-first
/// 2. stylesheet or script extension: cache-first
/// 3. one of `cdn_hosts`: stale-while-revalidate
/// 4. anything else: network-first
pub fn classify(url: &Url, cdn_hosts: &[String]) -> Strategy {
    let path = url.path().to_ascii_lowercase();

    if path == "/" || has_extension(&path, DOCUMENT_EXTENSIONS) {
        return Strategy::NetworkFirst;
    }

    if has_extension(&path, ASSET_EXTENSIONS) {
        return Strategy::CacheFirst;
    }

    if let Some(host) = url.host_str()
        && cdn_hosts.iter().any(|cdn| cdn.eq_ignore_ascii_case(host))
    {
        return Strategy::StaleWhileRevalidate;
    }

    Strategy::NetworkFirst
}

fn has_extension(path: &str, extensions: &[&str]) -> bool {
    extensions.iter().any(|ext| path.ends_with(ext))
}
