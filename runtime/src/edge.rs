// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-request pipeline: assign, look up variants, fetch, compose, rewrite.

use crate::assignment::{resolve_assignment_with, ArmPicker, RandomPicker, Resolution};
use crate::compose::{compose, ResponseEnvelope};
use crate::config::EdgeConfig;
use crate::error::EdgeError;
use crate::fetcher::{build_client, VariantFetcher};
use crate::rewrite::{default_rules, transform, RuleSet};
use crate::variants::{CachedVariantSource, HttpVariantSource, VariantSource};
use std::sync::Arc;
use tracing::{debug, info};

/// Immutable state shared by all in-flight requests.
///
/// Everything that varies per request (the assignment, the variant pair,
/// the fetched document) is created inside [`EdgeService::handle`] and
/// passed along explicitly.
pub struct EdgeService {
    source: Arc<dyn VariantSource>,
    fetcher: VariantFetcher,
    rules: RuleSet,
    picker: Arc<dyn ArmPicker>,
}

impl EdgeService {
    pub fn new(source: Arc<dyn VariantSource>, fetcher: VariantFetcher) -> Self {
        Self {
            source,
            fetcher,
            rules: default_rules(),
            picker: Arc::new(RandomPicker),
        }
    }

    /// HTTP variant source (cached unless the TTL is zero) plus fetcher.
    pub fn from_config(config: &EdgeConfig) -> reqwest::Result<Self> {
        let client = build_client(config)?;
        let http = HttpVariantSource::new(client.clone(), config.variants_url.clone());
        let source: Arc<dyn VariantSource> = if config.cache_ttl_secs == 0 {
            Arc::new(http)
        } else {
            Arc::new(CachedVariantSource::new(http, config.cache_ttl()))
        };
        Ok(Self::new(
            source,
            VariantFetcher::new(client, config.max_retries),
        ))
    }

    pub fn with_rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_picker(mut self, picker: Arc<dyn ArmPicker>) -> Self {
        self.picker = picker;
        self
    }

    pub fn resolve(&self, cookie_header: Option<&str>) -> Resolution {
        resolve_assignment_with(cookie_header, self.picker.as_ref())
    }

    /// Handle one request given its raw `Cookie` header.
    ///
    /// The arm is decided before any network call and never changes
    /// afterwards; a failure fetching the assigned arm is returned as an
    /// error instead of falling back to the other arm. A rule set the
    /// rewriter rejects is also an error, raised before any part of the
    /// response is produced.
    pub async fn handle(&self, cookie_header: Option<&str>) -> Result<ResponseEnvelope, EdgeError> {
        let Resolution { assignment, is_new } = self.resolve(cookie_header);
        debug!(arm = %assignment, is_new, "resolved assignment");

        let pair = self.source.variants().await?;
        let url = pair.url_for(assignment);

        let fetched = self.fetcher.fetch_variant(url).await?;
        info!(arm = %assignment, is_new, %url, status = %fetched.status, "serving variant");

        let envelope = compose(fetched, assignment, is_new);
        Ok(transform(envelope, assignment, &self.rules)?)
    }
}
