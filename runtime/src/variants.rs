// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! The variant source: where the two arm URLs come from.
//!
//! The default source GETs a JSON document of the form
//! `{"variants": ["<arm A url>", "<arm B url>"]}`. [`CachedVariantSource`]
//! can sit in front of any source to reuse its answer for a short TTL.

use crate::assignment::Assignment;
use crate::error::EdgeError;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use url::Url;

/// The two candidate pages, in arm order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantPair {
    arm_a: Url,
    arm_b: Url,
}

impl VariantPair {
    pub fn new(arm_a: Url, arm_b: Url) -> Self {
        Self { arm_a, arm_b }
    }

    /// Build a pair from the first two entries of a variant list.
    ///
    /// Extra entries are ignored. Both URLs must be absolute http(s) URLs.
    pub fn from_list(urls: &[String]) -> Result<Self, String> {
        let [a, b, ..] = urls else {
            return Err(format!("expected two variant urls, got {}", urls.len()));
        };
        Ok(Self::new(parse_arm_url(a)?, parse_arm_url(b)?))
    }

    /// URL serving the given arm.
    pub fn url_for(&self, assignment: Assignment) -> &Url {
        match assignment {
            Assignment::ArmA => &self.arm_a,
            Assignment::ArmB => &self.arm_b,
        }
    }
}

fn parse_arm_url(raw: &str) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("invalid variant url {raw:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(format!("unsupported scheme {other:?} in variant url {raw:?}")),
    }
}

/// Anything that can produce the current variant pair.
#[async_trait]
pub trait VariantSource: Send + Sync {
    async fn variants(&self) -> Result<VariantPair, EdgeError>;
}

/// Wire format of the variant endpoint.
#[derive(Debug, Deserialize)]
struct VariantsDocument {
    variants: Vec<String>,
}

/// Variant source backed by an HTTP JSON endpoint.
#[derive(Clone)]
pub struct HttpVariantSource {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpVariantSource {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl VariantSource for HttpVariantSource {
    async fn variants(&self) -> Result<VariantPair, EdgeError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| EdgeError::config(&self.endpoint, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EdgeError::config(
                &self.endpoint,
                format!("unexpected status {status}"),
            ));
        }

        let doc: VariantsDocument = resp
            .json()
            .await
            .map_err(|e| EdgeError::config(&self.endpoint, e))?;
        if doc.variants.len() > 2 {
            debug!(
                count = doc.variants.len(),
                "variant source returned extra entries; using the first two"
            );
        }

        VariantPair::from_list(&doc.variants).map_err(|e| EdgeError::config(&self.endpoint, e))
    }
}

struct CacheEntry {
    pair: VariantPair,
    cached_at: Instant,
}

/// Reuses the wrapped source's pair until the TTL runs out.
///
/// The cache belongs to exactly one inner source, so pairs from different
/// endpoints never mix. Failures are not cached. Callers that miss at the
/// same time share a single upstream refresh.
pub struct CachedVariantSource<S> {
    inner: S,
    ttl: Duration,
    slot: RwLock<Option<CacheEntry>>,
    refresh: Mutex<()>,
}

impl<S: VariantSource> CachedVariantSource<S> {
    pub fn new(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            slot: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    async fn fresh(&self) -> Option<VariantPair> {
        self.slot
            .read()
            .await
            .as_ref()
            .filter(|entry| entry.cached_at.elapsed() < self.ttl)
            .map(|entry| entry.pair.clone())
    }

    /// Drop the cached pair so the next call goes upstream.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

#[async_trait]
impl<S: VariantSource> VariantSource for CachedVariantSource<S> {
    async fn variants(&self) -> Result<VariantPair, EdgeError> {
        if let Some(pair) = self.fresh().await {
            return Ok(pair);
        }

        let _refresh = self.refresh.lock().await;
        // Someone else may have refreshed while we waited for the lock.
        if let Some(pair) = self.fresh().await {
            return Ok(pair);
        }

        let pair = match self.inner.variants().await {
            Ok(pair) => pair,
            Err(e) => {
                warn!("variant source failed, cache not refreshed: {e}");
                return Err(e);
            }
        };

        *self.slot.write().await = Some(CacheEntry {
            pair: pair.clone(),
            cached_at: Instant::now(),
        });
        Ok(pair)
    }
}
