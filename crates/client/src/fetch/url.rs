//! Request URL resolution for consistent cache keys.

/// Error type for URL resolution failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Resolve a manifest entry or request target against the app origin.
///
/// Absolute URLs keep their host with the fragment dropped; paths such as
/// `/app.css` are joined onto `origin`.
pub fn resolve(origin: &url::Url, input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let joined = origin.join(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    finish(joined)
}

fn finish(mut parsed: url::Url) -> Result<url::Url, UrlError> {
    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str() {
        let lowered = host.to_lowercase();
        parsed
            .set_host(Some(&lowered))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> url::Url {
        url::Url::parse("http://localhost:8080").unwrap()
    }

    #[test]
    fn test_resolve_lowercase_host() {
        let url = resolve(&origin(), "https://CDNJS.Cloudflare.COM/x.css").unwrap();
        assert_eq!(url.host_str(), Some("cdnjs.cloudflare.com"));
    }

    #[test]
    fn test_resolve_preserve_query() {
        let url = resolve(&origin(), "/api/data?a=1&b=2#top").unwrap();
        assert_eq!(url.query(), Some("a=1&b=2"));
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_resolve_empty() {
        assert!(matches!(resolve(&origin(), ""), Err(UrlError::Empty)));
        assert!(matches!(resolve(&origin(), "   "), Err(UrlError::Empty)));
    }

    #[test]
    fn test_resolve_relative_path() {
        let url = resolve(&origin(), "/enhanced-styles.css").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/enhanced-styles.css");
    }

    #[test]
    fn test_resolve_root() {
        let url = resolve(&origin(), "/").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_resolve_absolute_keeps_host() {
        let url = resolve(&origin(), "https://telegram.org/js/telegram-web-app.js#x").unwrap();
        assert_eq!(url.as_str(), "https://telegram.org/js/telegram-web-app.js");
    }

    #[test]
    fn test_resolve_rejects_other_schemes() {
        let result = resolve(&origin(), "data:text/plain,hi");
        assert!(matches!(result, Err(UrlError::UnsupportedScheme(_))));
    }
}
