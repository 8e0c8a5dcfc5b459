//! Access token cache.
//!
//! Used only with [`TokenPolicy::Cached`](crate::config::TokenPolicy).
//! Readers share an `RwLock`; refreshes are serialized through a separate
//! `Mutex` so that concurrent callers hitting an expired token trigger a
//! single `gettoken` call between them.

use std::future::Future;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use crate::error::WecomError;
use crate::models::AccessToken;

/// A cached token is treated as stale this long before it actually expires.
pub const REFRESH_MARGIN: Duration = Duration::from_secs(5 * 60);

/// Longest lifetime honored for a cached token, whatever `expires_in` says.
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

impl CachedToken {
    fn new(token: &AccessToken) -> Self {
        let lifetime = Duration::from_secs(token.expires_in)
            .min(MAX_TOKEN_LIFETIME)
            .saturating_sub(REFRESH_MARGIN);
        let now = Instant::now();
        Self {
            value: token.value.clone(),
            refresh_at: now.checked_add(lifetime).unwrap_or(now),
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// Per-client token cache.
#[derive(Default)]
pub struct TokenCache {
    slot: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl TokenCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached token if it is still fresh.
    pub async fn current(&self) -> Option<String> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|cached| cached.is_fresh())
            .map(|cached| cached.value.clone())
    }

    /// Returns a fresh token, calling `fetch` at most once if none is cached.
    ///
    /// # Errors
    ///
    /// Propagates the error from `fetch`; the cache is left empty.
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<String, WecomError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<AccessToken, WecomError>>,
    {
        if let Some(value) = self.current().await {
            tracing::debug!("Using cached access token");
            return Ok(value);
        }

        let _guard = self.refresh.lock().await;

        // Another task may have refreshed while we waited for the lock
        if let Some(value) = self.current().await {
            tracing::debug!("Access token refreshed by a concurrent call");
            return Ok(value);
        }

        tracing::debug!("Cached access token missing or stale, refreshing");
        let token = fetch().await?;
        let cached = CachedToken::new(&token);
        *self.slot.write().await = Some(cached);

        Ok(token.value)
    }

    /// Drops the cached token so the next call refreshes it.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }

    /// Drops the cached token only if it is still `value`.
    ///
    /// A token refreshed by another task after `value` was handed out is kept.
    pub async fn invalidate_if(&self, value: &str) {
        let mut slot = self.slot.write().await;
        if slot.as_ref().is_some_and(|cached| cached.value == value) {
            *slot = None;
        }
    }
}
