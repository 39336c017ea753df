//! HTTP transport used by the offline cache.
//!
//! ### Semantics
//! - Any HTTP status, including 4xx/5xx, is a value, not an error
//! - Transport failures (DNS, connect, TLS, body read) are `Error::Network`
//! - Requests exceeding the timeout fail with `Error::FetchTimeout`
//! - Bodies over `max_bytes` fail with `Error::FetchTooLarge`
//!
//! ### Headers
//! - `Set-Cookie` is never kept
//! - Values that are not valid UTF-8 are dropped; stored responses only carry text headers
//!
//! ### URL Resolution
//! - Trim whitespace, lowercase host, remove fragments
//! - Relative paths resolve against the app origin

pub mod url;

use async_trait::async_trait;
use reqwest::{Client, Method, header::{self, HeaderMap}};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, resolve};

use umc_core::{AppConfig, Error, Request, Response};

/// A GET-capable fetch primitive.
///
/// Errors surface as a rejected future, never as a status code.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "umc-offline/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "umc-offline/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

impl From<&AppConfig> for FetchConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// HTTP fetch client backed by reqwest.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    fn map_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::FetchTimeout(format!("no response within {}ms", self.config.timeout.as_millis()))
        } else {
            Error::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let response = self
            .http
            .request(method, request.url.as_str())
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let status = response.status().as_u16();
        let headers = storable_headers(response.headers());

        let bytes = response.bytes().await.map_err(|e| self.map_error(e))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            "fetched {} {} -> {} in {}ms ({} bytes)",
            request.method,
            request.url,
            status,
            start.elapsed().as_millis(),
            bytes.len()
        );

        Ok(Response { status, headers, body: bytes })
    }
}

/// Header pairs kept on a fetched response.
fn storable_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter(|(name, _)| *name != header::SET_COOKIE)
        .filter_map(|(name, value)| match value.to_str() {
            Ok(v) => Some((name.as_str().to_string(), v.to_string())),
            Err(_) => {
                tracing::debug!(header = %name, "dropping non-UTF-8 header value");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "umc-offline/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, Duration::from_millis(20000));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = AppConfig { user_agent: "umc-test".into(), timeout_ms: 1500, max_bytes: 1024, ..Default::default() };
        let config = FetchConfig::from(&app);
        assert_eq!(config.user_agent, "umc-test");
        assert_eq!(config.timeout, Duration::from_millis(1500));
        assert_eq!(config.max_bytes, 1024);
        assert_eq!(config.max_redirects, 5);
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_storable_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, header::HeaderValue::from_static("text/css"));
        headers.insert(header::SET_COOKIE, header::HeaderValue::from_static("session=abc"));
        headers.insert("x-raw", header::HeaderValue::from_bytes(b"caf\xe9").unwrap());

        assert_eq!(storable_headers(&headers), vec![("content-type".to_string(), "text/css".to_string())]);
    }

    #[tokio::test]
    async fn test_fetch_silent_server_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = FetchConfig { timeout: Duration::from_millis(100), ..Default::default() };
        let client = FetchClient::new(config).unwrap();
        let request = Request::get(::url::Url::parse(&format!("http://{addr}/")).unwrap());

        let err = tokio::time::timeout(Duration::from_secs(5), client.fetch(&request))
            .await
            .expect("client deadline should fire first")
            .unwrap_err();
        assert!(matches!(err, Error::FetchTimeout(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_fetch_unreachable_is_network_error() {
        let config = FetchConfig { timeout: Duration::from_millis(2000), ..Default::default() };
        let client = FetchClient::new(config).unwrap();
        let request = Request::get(::url::Url::parse("http://127.0.0.1:9/").unwrap());

        let err = client.fetch(&request).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)), "unexpected error: {err}");
    }
}
