//! Key set sources.
//!
//! A [`KeySetSource`] produces the raw key set document. The resolver owns
//! caching and rate limiting; sources only perform the fetch.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::{KeyResolutionError, KeyResult};

/// Default HTTP request timeout for key set fetches (10 seconds).
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout (5 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upstream publisher of a JSON Web Key Set.
#[async_trait]
pub trait KeySetSource: Send + Sync {
    /// Fetch the current key set document.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyResolutionError`] if the document cannot be obtained.
    async fn fetch_key_set(&self) -> KeyResult<Value>;

    /// Human-readable location of the key set, for logs.
    fn location(&self) -> &str;
}

/// Fetches the key set over HTTPS.
pub struct HttpKeySetSource {
    client: reqwest::Client,
    url: Url,
}

impl HttpKeySetSource {
    /// Create a source for the given key set URL with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns [`KeyResolutionError::Configuration`] if the URL is invalid or
    /// the HTTP client cannot be built.
    pub fn new(url: &str) -> KeyResult<Self> {
        Self::with_timeout(url, DEFAULT_FETCH_TIMEOUT)
    }

    /// Create a source with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`KeyResolutionError::Configuration`] if the URL is invalid or
    /// the HTTP client cannot be built.
    pub fn with_timeout(url: &str, timeout: Duration) -> KeyResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| KeyResolutionError::Configuration(format!("invalid key set URL {url}: {e}")))?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("capgate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                KeyResolutionError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, url })
    }

    fn transport_error(&self, e: &reqwest::Error) -> KeyResolutionError {
        if e.is_timeout() {
            KeyResolutionError::Timeout {
                url: self.url.to_string(),
            }
        } else {
            KeyResolutionError::Unreachable {
                url: self.url.to_string(),
                message: e.to_string(),
            }
        }
    }
}

#[async_trait]
impl KeySetSource for HttpKeySetSource {
    async fn fetch_key_set(&self) -> KeyResult<Value> {
        debug!(url = %self.url, "fetching key set");

        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(KeyResolutionError::Unreachable {
                url: self.url.to_string(),
                message: format!("key set endpoint returned {status}"),
            });
        }

        response.json::<Value>().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(&e)
            } else {
                KeyResolutionError::InvalidKeySet(format!("failed to parse key set: {e}"))
            }
        })
    }

    fn location(&self) -> &str {
        self.url.as_str()
    }
}

/// In-memory key set source for tests.
#[cfg(any(test, feature = "test-support"))]
pub mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::KeySetSource;
    use crate::error::{KeyResolutionError, KeyResult};

    /// A key set source serving a fixed document and counting fetches.
    ///
    /// The document can be swapped to simulate key rotation, and an optional
    /// delay widens the window in which concurrent misses can race.
    pub struct StaticKeySetSource {
        document: Mutex<Option<Value>>,
        fetches: AtomicUsize,
        delay: Option<Duration>,
    }

    impl StaticKeySetSource {
        /// Serve `document` on every fetch.
        #[must_use]
        pub fn new(document: Value) -> Self {
            Self {
                document: Mutex::new(Some(document)),
                fetches: AtomicUsize::new(0),
                delay: None,
            }
        }

        /// A source whose endpoint is unreachable.
        #[must_use]
        pub fn unreachable() -> Self {
            Self {
                document: Mutex::new(None),
                fetches: AtomicUsize::new(0),
                delay: None,
            }
        }

        /// Sleep for `delay` before answering each fetch.
        #[must_use]
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Replace the served document (key rotation).
        pub fn rotate(&self, document: Value) {
            if let Ok(mut slot) = self.document.lock() {
                *slot = Some(document);
            }
        }

        /// Number of fetches answered so far.
        #[must_use]
        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KeySetSource for StaticKeySetSource {
        async fn fetch_key_set(&self) -> KeyResult<Value> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let document = self
                .document
                .lock()
                .map_err(|e| KeyResolutionError::InvalidKeySet(e.to_string()))?
                .clone();
            document.ok_or_else(|| KeyResolutionError::Unreachable {
                url: self.location().to_string(),
                message: "connection refused".to_string(),
            })
        }

        fn location(&self) -> &str {
            "memory://jwks"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_source_rejects_invalid_url() {
        assert!(matches!(
            HttpKeySetSource::new("not a url"),
            Err(KeyResolutionError::Configuration(_))
        ));
    }

    #[test]
    fn test_http_source_location() {
        let source = HttpKeySetSource::new("https://issuer.example/.well-known/jwks.json").unwrap();
        assert_eq!(
            source.location(),
            "https://issuer.example/.well-known/jwks.json"
        );
    }

    #[tokio::test]
    async fn test_http_source_unreachable() {
        // Port 9 (discard) on localhost is closed in test environments.
        let source =
            HttpKeySetSource::with_timeout("http://127.0.0.1:9/jwks.json", Duration::from_secs(2))
                .unwrap();
        let err = source.fetch_key_set().await.unwrap_err();
        assert!(matches!(
            err,
            KeyResolutionError::Unreachable { .. } | KeyResolutionError::Timeout { .. }
        ));
    }
}
