// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWKS (JSON Web Key Set) fetching and caching.
//!
//! - The key set is fetched from `https://{domain}/.well-known/jwks.json`
//! - It is cached for a configurable TTL (zero disables caching)
//! - Fetches are serialized: callers that miss the cache while a fetch is in
//!   flight wait for it and share its result
//! - A stale key set is served if a refresh fails, and no new fetch is made
//!   for the minimum refresh interval after the failure
//! - The verifier asks for a refresh when a `kid` is missing from a cached
//!   set, so key rotation is picked up without waiting for the TTL. That
//!   refresh is skipped when keys were fetched within the minimum interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet};
use jsonwebtoken::DecodingKey;
use tokio::sync::{Mutex, RwLock};
use url::Url;

use super::error::AuthError;

/// Default JWKS cache TTL (5 minutes).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(300);

/// Default timeout for the JWKS request.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Default minimum time between a fetch and an unknown-`kid` refresh, and
/// the back-off after a failed refresh.
pub const DEFAULT_MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

/// JWKS cache entry.
struct CacheEntry {
    keys: Arc<JwkSet>,
    fetched_at: Instant,
    /// Set when a refresh failed. Until then the stale keys are served
    /// without contacting the endpoint.
    retry_after: Option<Instant>,
}

impl CacheEntry {
    fn backing_off(&self) -> bool {
        self.retry_after.is_some_and(|at| Instant::now() < at)
    }
}

enum KeySource {
    Remote { client: reqwest::Client, url: Url },
    Static(JwkSet),
}

/// A key set handed out by [`JwksManager::key_set`].
pub struct KeySet {
    pub keys: Arc<JwkSet>,
    /// A fetch was attempted while producing this set, so refreshing again
    /// on a `kid` miss is pointless.
    pub just_fetched: bool,
}

/// JWKS manager with caching.
pub struct JwksManager {
    source: KeySource,
    cache_ttl: Duration,
    min_refresh_interval: Duration,
    cache: RwLock<Option<CacheEntry>>,
    /// Held for the duration of a fetch. Holds the error of the last fetch
    /// if it failed.
    fetch_lock: Mutex<Option<AuthError>>,
    /// Completed fetch attempts, successful or not.
    fetches: AtomicU64,
}

impl JwksManager {
    /// Create a manager fetching from `url`.
    ///
    /// # Arguments
    /// - `url`: the JWKS endpoint (e.g., `https://tenant.eu.auth0.com/.well-known/jwks.json`)
    /// - `timeout`: request timeout for each fetch
    pub fn remote(url: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_source(KeySource::Remote { client, url }))
    }

    /// Create a manager serving a fixed key set.
    pub fn from_static(keys: JwkSet) -> Self {
        Self::with_source(KeySource::Static(keys))
    }

    fn with_source(source: KeySource) -> Self {
        Self {
            source,
            cache_ttl: DEFAULT_CACHE_TTL,
            min_refresh_interval: DEFAULT_MIN_REFRESH_INTERVAL,
            cache: RwLock::new(None),
            fetch_lock: Mutex::new(None),
            fetches: AtomicU64::new(0),
        }
    }

    /// Create with custom cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Create with a custom minimum refresh interval.
    pub fn with_min_refresh_interval(mut self, interval: Duration) -> Self {
        self.min_refresh_interval = interval;
        self
    }

    /// Get the JWKS URL, if the keys are fetched remotely.
    pub fn jwks_url(&self) -> Option<&Url> {
        match &self.source {
            KeySource::Remote { url, .. } => Some(url),
            KeySource::Static(_) => None,
        }
    }

    /// Get the current key set, fetching it if the cache is empty or expired.
    pub async fn key_set(&self) -> Result<KeySet, AuthError> {
        let seen = self.fetches.load(Ordering::Acquire);
        if let Some(set) = self.cached().await {
            return Ok(set);
        }

        let mut last_error = self.fetch_lock.lock().await;
        if self.fetches.load(Ordering::Acquire) != seen {
            // Another caller fetched while this one waited
            if let Some(entry) = &*self.cache.read().await {
                return Ok(KeySet {
                    keys: Arc::clone(&entry.keys),
                    just_fetched: true,
                });
            }
            if let Some(err) = &*last_error {
                return Err(err.clone());
            }
        }

        let err = match self.fetch_and_store(&mut last_error).await {
            Ok(keys) => {
                return Ok(KeySet {
                    keys,
                    just_fetched: true,
                })
            }
            Err(err) => err,
        };

        let cache = self.cache.read().await;
        match &*cache {
            Some(entry) => {
                tracing::warn!(
                    error = %err,
                    age_secs = entry.fetched_at.elapsed().as_secs(),
                    retry_in_secs = self.min_refresh_interval.as_secs(),
                    "JWKS refresh failed, serving stale key set"
                );
                Ok(KeySet {
                    keys: Arc::clone(&entry.keys),
                    just_fetched: true,
                })
            }
            None => Err(err),
        }
    }

    /// Force refresh the JWKS cache.
    pub async fn refresh(&self) -> Result<Arc<JwkSet>, AuthError> {
        let mut last_error = self.fetch_lock.lock().await;
        self.fetch_and_store(&mut last_error).await
    }

    /// Refresh after a `kid` was not found in the cached set.
    ///
    /// Returns `None` without fetching when keys were fetched within the
    /// minimum refresh interval or a failed refresh is backing off. A caller
    /// that waited on another fetch gets that fetch's keys.
    pub async fn refresh_for_unknown_kid(&self) -> Option<Arc<JwkSet>> {
        let seen = self.fetches.load(Ordering::Acquire);
        let mut last_error = self.fetch_lock.lock().await;
        {
            let cache = self.cache.read().await;
            if let Some(entry) = &*cache {
                if self.fetches.load(Ordering::Acquire) != seen {
                    return Some(Arc::clone(&entry.keys));
                }
                if entry.fetched_at.elapsed() < self.min_refresh_interval || entry.backing_off() {
                    tracing::debug!("JWKS fetched recently, not refreshing for unknown kid");
                    return None;
                }
            }
        }

        match self.fetch_and_store(&mut last_error).await {
            Ok(keys) => Some(keys),
            Err(err) => {
                tracing::warn!(error = %err, "JWKS refresh for unknown kid failed");
                None
            }
        }
    }

    /// Check if JWKS is currently cached and valid.
    pub async fn is_cached(&self) -> bool {
        let cache = self.cache.read().await;
        if let Some(entry) = &*cache {
            entry.fetched_at.elapsed() < self.cache_ttl
        } else {
            false
        }
    }

    /// The cached set if it is within its TTL, or stale while backing off.
    async fn cached(&self) -> Option<KeySet> {
        let cache = self.cache.read().await;
        let entry = cache.as_ref()?;
        if entry.fetched_at.elapsed() < self.cache_ttl {
            Some(KeySet {
                keys: Arc::clone(&entry.keys),
                just_fetched: false,
            })
        } else if entry.backing_off() {
            Some(KeySet {
                keys: Arc::clone(&entry.keys),
                just_fetched: true,
            })
        } else {
            None
        }
    }

    /// Fetch and update the cache. Must be called with `fetch_lock` held.
    async fn fetch_and_store(
        &self,
        last_error: &mut Option<AuthError>,
    ) -> Result<Arc<JwkSet>, AuthError> {
        let result = self.fetch().await;
        let outcome = {
            let mut cache = self.cache.write().await;
            match result {
                Ok(keys) => {
                    let keys = Arc::new(keys);
                    *cache = Some(CacheEntry {
                        keys: Arc::clone(&keys),
                        fetched_at: Instant::now(),
                        retry_after: None,
                    });
                    *last_error = None;
                    Ok(keys)
                }
                Err(err) => {
                    if let Some(entry) = cache.as_mut() {
                        entry.retry_after = Some(Instant::now() + self.min_refresh_interval);
                    }
                    *last_error = Some(err.clone());
                    Err(err)
                }
            }
        };
        self.fetches.fetch_add(1, Ordering::Release);
        outcome
    }

    async fn fetch(&self) -> Result<JwkSet, AuthError> {
        match &self.source {
            KeySource::Static(keys) => Ok(keys.clone()),
            KeySource::Remote { client, url } => fetch_remote(client, url).await,
        }
    }
}

/// Fetch JWKS from the endpoint.
async fn fetch_remote(client: &reqwest::Client, url: &Url) -> Result<JwkSet, AuthError> {
    tracing::debug!(%url, "fetching JWKS");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(AuthError::KeySetUnavailable(format!(
            "HTTP {} from JWKS endpoint",
            response.status()
        )));
    }

    let jwks: JwkSet = response
        .json()
        .await
        .map_err(|e| AuthError::KeySetUnavailable(e.to_string()))?;

    tracing::info!(%url, keys = jwks.keys.len(), "fetched JWKS");
    Ok(jwks)
}

/// Find the key for `kid`. If several keys share the `kid`, the last one wins.
pub fn find_key<'a>(keys: &'a JwkSet, kid: &str) -> Option<&'a Jwk> {
    keys.keys
        .iter()
        .rev()
        .find(|jwk| jwk.common.key_id.as_deref() == Some(kid))
}

/// Convert a JWK to a DecodingKey.
pub fn decoding_key(jwk: &Jwk) -> Result<DecodingKey, AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            DecodingKey::from_rsa_components(&rsa.n, &rsa.e).map_err(|e| {
                tracing::debug!(error = %e, "unusable RSA key in JWKS");
                AuthError::MalformedToken
            })
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            DecodingKey::from_ec_components(&ec.x, &ec.y).map_err(|e| {
                tracing::debug!(error = %e, "unusable EC key in JWKS");
                AuthError::MalformedToken
            })
        }
        _ => Err(AuthError::MalformedToken),
    }
}
