//! Cached HTTP fetcher
//!
//! `CachedFetcher` turns a URL into parsed JSON, consulting the shared
//! `CacheManager` first and only going to the network on a miss or after the
//! cached entry has expired.

use reqwest::cookie::Jar;
use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode, Url};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::cache::CacheManager;
use crate::config::{ClientConfig, ConfigError};

/// Errors that can occur when fetching a resource
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request never produced a complete response (DNS, connect, timeout, body read)
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with something other than 200 OK
    #[error("{url} returned HTTP {status}")]
    HttpStatus {
        url: String,
        status: StatusCode,
        /// Full response body, kept for inspection
        body: String,
    },

    /// The body was not valid JSON
    #[error("Failed to parse JSON response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A 200 response with an empty or `null` body
    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
}

impl FetchError {
    /// The URL the failed request was sent to
    pub fn url(&self) -> &str {
        match self {
            FetchError::Transport { url, .. }
            | FetchError::HttpStatus { url, .. }
            | FetchError::Decode { url, .. }
            | FetchError::EmptyBody { url } => url,
        }
    }

    /// The response status, when the upstream answered with a non-200
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            FetchError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// Fetches JSON documents over HTTP, caching successful responses by URL
///
/// Holds two transports: one backed by a cookie jar for requests that attach
/// credentials, and one with no cookie store at all.
#[derive(Debug, Clone)]
pub struct CachedFetcher {
    credentialed: Client,
    anonymous: Client,
    cookies: Arc<Jar>,
    cache: CacheManager,
    ttl: Duration,
}

impl CachedFetcher {
    /// Builds a fetcher from client settings and the cache it should fill
    pub fn new(config: &ClientConfig, cache: CacheManager) -> Result<Self, ConfigError> {
        let cookies = Arc::new(Jar::default());

        Ok(Self {
            credentialed: build_client(config, Some(cookies.clone()))?,
            anonymous: build_client(config, None)?,
            cookies,
            cache,
            ttl: config.cache_ttl,
        })
    }

    /// The cache this fetcher reads from and writes to
    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Adds a cookie (in `Set-Cookie` syntax) that credentialed requests to `url` will carry
    pub fn add_cookie(&self, cookie: &str, url: &Url) {
        self.cookies.add_cookie_str(cookie, url);
    }

    /// Returns the JSON document at `url`, from cache when fresh
    ///
    /// # Arguments
    /// * `url` - Absolute URL to GET; also the cache key
    /// * `attach_credentials` - Whether the request carries the cookie jar
    ///
    /// # Returns
    /// * `Ok(Value)` - The parsed body, cached for the configured TTL
    /// * `Err(FetchError)` - Transport failure, non-200 status, bad or empty body.
    ///   Failures are never cached.
    pub async fn fetch(&self, url: &str, attach_credentials: bool) -> Result<Value, FetchError> {
        if let Some(cached) = self.cache.get_fresh(url) {
            debug!(url, "Cache hit");
            return Ok(cached);
        }

        debug!(url, attach_credentials, "Cache miss, fetching");
        let client = if attach_credentials {
            &self.credentialed
        } else {
            &self.anonymous
        };

        let transport_error = |source: reqwest::Error| {
            warn!(url, error = %source, "Request failed");
            FetchError::Transport {
                url: url.to_string(),
                source,
            }
        };

        let response = client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(transport_error)?;
        let status = response.status();

        if status != StatusCode::OK {
            warn!(url, %status, "Unexpected response status");
            // The status is the error; a body that fails to arrive is reported as empty
            let body = response.text().await.unwrap_or_else(|error| {
                debug!(url, %error, "Failed to read error response body");
                String::new()
            });
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                status,
                body,
            });
        }

        let body = response.text().await.map_err(transport_error)?;

        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        let value: Value = serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })?;

        if value.is_null() {
            return Err(FetchError::EmptyBody {
                url: url.to_string(),
            });
        }

        self.cache.write(url, value.clone(), self.ttl);
        Ok(value)
    }
}

fn build_client(config: &ClientConfig, cookies: Option<Arc<Jar>>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder().user_agent(config.user_agent.as_str());

    if let Some(timeout) = config.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(jar) = cookies {
        builder = builder.cookie_provider(jar);
    }

    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use mockito::Matcher;
    use std::net::TcpListener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn create_test_fetcher() -> (CachedFetcher, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::default());
        let cache = CacheManager::with_clock(clock.clone());
        let fetcher = CachedFetcher::new(&ClientConfig::default(), cache)
            .expect("Failed to build fetcher");
        (fetcher, clock)
    }

    /// A URL on a port nothing is listening on
    fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let port = listener.local_addr().expect("No local addr").port();
        drop(listener);
        format!("http://127.0.0.1:{}/api/v2/berry/1/", port)
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/pokemon/pikachu/")
            .match_header("accept", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"name":"pikachu","id":25}"#)
            .expect(1)
            .create_async()
            .await;

        let (fetcher, _clock) = create_test_fetcher();
        let url = format!("{}/api/v2/pokemon/pikachu/", server.url());

        let first = fetcher.fetch(&url, true).await.unwrap();
        let second = fetcher.fetch(&url, true).await.unwrap();

        assert_eq!(first["name"], "pikachu");
        assert_eq!(first, second);
        assert!(fetcher.cache().contains(&url));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched_and_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/berry/1/")
            .with_status(200)
            .with_body(r#"{"name":"cheri"}"#)
            .expect(2)
            .create_async()
            .await;

        let (fetcher, clock) = create_test_fetcher();
        let url = format!("{}/api/v2/berry/1/", server.url());

        fetcher.fetch(&url, true).await.unwrap();
        let first_expiry = fetcher.cache().read(&url).unwrap().expires_at;

        clock.advance(chrono::Duration::seconds(1_000_001));
        fetcher.fetch(&url, true).await.unwrap();
        let refreshed = fetcher.cache().read(&url).unwrap();

        assert!(!refreshed.is_expired);
        assert_eq!(
            refreshed.expires_at,
            first_expiry + chrono::Duration::seconds(1_000_001)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found_is_an_error_and_not_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v2/pokemon/missingno/")
            .with_status(404)
            .with_body("Not Found")
            .expect(2)
            .create_async()
            .await;

        let (fetcher, _clock) = create_test_fetcher();
        let url = format!("{}/api/v2/pokemon/missingno/", server.url());

        let err = fetcher.fetch(&url, true).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.url(), url);
        match &err {
            FetchError::HttpStatus { body, .. } => assert_eq!(body, "Not Found"),
            other => panic!("expected HttpStatus, got {:?}", other),
        }
        assert!(!fetcher.cache().contains(&url));

        // Nothing cached, so the second call goes back to the network
        assert!(fetcher.fetch(&url, true).await.is_err());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_200_success_codes_are_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/item/1/")
            .with_status(204)
            .create_async()
            .await;

        let (fetcher, _clock) = create_test_fetcher();
        let url = format!("{}/api/v2/item/1/", server.url());

        let err = fetcher.fetch(&url, true).await.unwrap_err();
        assert_eq!(err.status(), Some(StatusCode::NO_CONTENT));
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_truncated_error_body_keeps_status() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Promise 100 bytes, send 5, then hang up
            let _ = socket
                .write_all(b"HTTP/1.1 500 Internal Server Error\r\ncontent-length: 100\r\n\r\nshort")
                .await;
            let _ = socket.shutdown().await;
        });

        let (fetcher, _clock) = create_test_fetcher();
        let url = format!("http://{}/api/v2/berry/1/", addr);

        let err = fetcher.fetch(&url, true).await.unwrap_err();

        match err {
            FetchError::HttpStatus { status, body, .. } => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
                assert!(body.is_empty());
            }
            other => panic!("expected HttpStatus, got {:?}", other),
        }
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let (fetcher, _clock) = create_test_fetcher();
        let url = refused_url();

        let err = fetcher.fetch(&url, true).await.unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(err.status().is_none());
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/move/1/")
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create_async()
            .await;

        let (fetcher, _clock) = create_test_fetcher();
        let url = format!("{}/api/v2/move/1/", server.url());

        let err = fetcher.fetch(&url, true).await.unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_empty_and_null_bodies_are_explicit_errors() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/v2/stat/empty/")
            .with_status(200)
            .with_body("")
            .create_async()
            .await;
        server
            .mock("GET", "/api/v2/stat/null/")
            .with_status(200)
            .with_body("null")
            .create_async()
            .await;

        let (fetcher, _clock) = create_test_fetcher();

        for path in ["/api/v2/stat/empty/", "/api/v2/stat/null/"] {
            let url = format!("{}{}", server.url(), path);
            let err = fetcher.fetch(&url, true).await.unwrap_err();
            assert!(matches!(err, FetchError::EmptyBody { .. }), "{}", path);
        }
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_credentials_policy_selects_cookie_jar() {
        let mut server = mockito::Server::new_async().await;
        let with_cookie = server
            .mock("GET", "/api/v2/type/fire/")
            .match_header("cookie", "session=abc")
            .with_status(200)
            .with_body(r#"{"name":"fire"}"#)
            .expect(1)
            .create_async()
            .await;
        let without_cookie = server
            .mock("GET", "/api/v2/type/water/")
            .match_header("cookie", Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"name":"water"}"#)
            .expect(1)
            .create_async()
            .await;

        let (fetcher, _clock) = create_test_fetcher();
        let base = Url::parse(&server.url()).unwrap();
        fetcher.add_cookie("session=abc; Path=/", &base);

        let fire = format!("{}/api/v2/type/fire/", server.url());
        let water = format!("{}/api/v2/type/water/", server.url());

        assert_eq!(fetcher.fetch(&fire, true).await.unwrap()["name"], "fire");
        assert_eq!(fetcher.fetch(&water, false).await.unwrap()["name"], "water");

        with_cookie.assert_async().await;
        without_cookie.assert_async().await;
    }

    #[tokio::test]
    async fn test_fresh_cache_short_circuits_network() {
        let (fetcher, _clock) = create_test_fetcher();
        let url = refused_url();
        fetcher
            .cache()
            .write(&url, serde_json::json!({"name": "cached"}), Duration::from_secs(60));

        let value = fetcher.fetch(&url, true).await.unwrap();

        assert_eq!(value["name"], "cached");
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::EmptyBody {
            url: "http://pokeapi.co/api/v2/berry/1/".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "http://pokeapi.co/api/v2/berry/1/ returned an empty body"
        );
    }
}
