//! Cached, rate-limited signing key resolution.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{KeyResolutionError, KeyResult};
use crate::key::{SigningKey, parse_key_set};
use crate::source::KeySetSource;

/// Length of the rate limiting window.
const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Default maximum number of cached keys.
const DEFAULT_MAX_ENTRIES: usize = 5;

/// Default maximum age of a cached key (10 minutes).
const DEFAULT_MAX_AGE: Duration = Duration::from_secs(600);

/// Default upstream fetches allowed per minute.
const DEFAULT_REQUESTS_PER_MINUTE: u32 = 10;

/// Cache and rate limit settings for a [`KeyResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Maximum number of keys held in the cache.
    pub max_entries: usize,
    /// How long a fetched key is served from the cache.
    pub max_age: Duration,
    /// Upstream key set fetches allowed per rolling minute.
    pub requests_per_minute: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_age: DEFAULT_MAX_AGE,
            requests_per_minute: DEFAULT_REQUESTS_PER_MINUTE,
        }
    }
}

struct CachedKey {
    key: Arc<SigningKey>,
    fetched_at: Instant,
}

/// Timestamps of recent upstream fetches. Guarded by the single-flight lock.
#[derive(Default)]
struct FetchWindow {
    recent: VecDeque<Instant>,
}

impl FetchWindow {
    /// Record a fetch if the window has room.
    fn try_acquire(&mut self, limit: u32) -> bool {
        while let Some(oldest) = self.recent.front() {
            if oldest.elapsed() >= RATE_WINDOW {
                self.recent.pop_front();
            } else {
                break;
            }
        }
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        if self.recent.len() >= limit {
            return false;
        }
        self.recent.push_back(Instant::now());
        true
    }
}

/// Resolves key ids to signing keys from a [`KeySetSource`].
///
/// One instance per process. The cache tolerates concurrent readers and
/// writers; upstream fetches go through a single-flight section so that
/// simultaneous misses trigger one fetch.
pub struct KeyResolver {
    source: Arc<dyn KeySetSource>,
    config: ResolverConfig,
    cache: DashMap<String, CachedKey>,
    window: Mutex<FetchWindow>,
    fetches: AtomicU64,
}

impl KeyResolver {
    /// Create a resolver over `source`.
    #[must_use]
    pub fn new(source: Arc<dyn KeySetSource>, config: ResolverConfig) -> Self {
        Self {
            source,
            config,
            cache: DashMap::new(),
            window: Mutex::new(FetchWindow::default()),
            fetches: AtomicU64::new(0),
        }
    }

    /// Resolver configuration.
    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve `kid` to its signing key.
    ///
    /// # Errors
    ///
    /// Returns a [`KeyResolutionError`] if the key set cannot be fetched, the
    /// rate limit is exhausted, or `kid` is not published.
    pub async fn resolve(&self, kid: &str) -> KeyResult<Arc<SigningKey>> {
        if let Some(key) = self.cached(kid) {
            debug!(kid, "signing key cache hit");
            return Ok(key);
        }

        let mut window = self.window.lock().await;

        // Another task may have filled the cache while we waited.
        if let Some(key) = self.cached(kid) {
            debug!(kid, "signing key filled by concurrent fetch");
            return Ok(key);
        }

        if !window.try_acquire(self.config.requests_per_minute) {
            warn!(
                kid,
                limit = self.config.requests_per_minute,
                "key set rate limit exceeded"
            );
            return Err(KeyResolutionError::RateLimited {
                limit: self.config.requests_per_minute,
            });
        }

        self.fetches.fetch_add(1, Ordering::Relaxed);
        let document = self.source.fetch_key_set().await?;
        let keys = parse_key_set(&document)?;
        info!(
            location = self.source.location(),
            keys = keys.len(),
            "fetched key set"
        );

        let mut found = None;
        for key in keys {
            let key = Arc::new(key);
            if key.kid() == kid {
                found = Some(Arc::clone(&key));
            }
            self.insert(key);
        }
        drop(window);

        found.ok_or_else(|| KeyResolutionError::KeyNotFound {
            kid: kid.to_string(),
        })
    }

    /// Drop `kid` from the cache. Returns whether it was present.
    pub fn invalidate(&self, kid: &str) -> bool {
        self.cache.remove(kid).is_some()
    }

    /// Drop every cached key.
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Number of keys currently cached (including stale entries).
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Number of upstream fetches performed.
    #[must_use]
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }

    fn cached(&self, kid: &str) -> Option<Arc<SigningKey>> {
        let entry = self.cache.get(kid)?;
        if entry.fetched_at.elapsed() < self.config.max_age {
            Some(Arc::clone(&entry.key))
        } else {
            None
        }
    }

    fn insert(&self, key: Arc<SigningKey>) {
        if self.config.max_entries == 0 {
            return;
        }
        let kid = key.kid().to_string();
        while !self.cache.contains_key(&kid) && self.cache.len() >= self.config.max_entries {
            let oldest = self
                .cache
                .iter()
                .min_by_key(|entry| entry.fetched_at)
                .map(|entry| entry.key().clone());
            match oldest {
                Some(oldest) => {
                    debug!(kid = %oldest, "evicting cached signing key");
                    self.cache.remove(&oldest);
                },
                None => break,
            }
        }
        self.cache.insert(
            kid,
            CachedKey {
                key,
                fetched_at: Instant::now(),
            },
        );
    }
}
