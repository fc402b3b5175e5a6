// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the edge handler.
//!
//! Only upstream failures are errors. A missing or unrecognized stickiness
//! cookie is a first visit, and a rewrite target without the attribute it
//! needs is left alone; neither ever reaches this module.

/// Failures that abort a request before a response body is produced.
#[derive(thiserror::Error, Debug)]
pub enum EdgeError {
    /// The variant source was unreachable or returned an unusable document.
    #[error("failed to load variants from {endpoint}: {reason}")]
    ConfigFetch { endpoint: String, reason: String },

    /// The assigned arm could not be fetched.
    #[error("failed to fetch variant {url}: {source}")]
    VariantFetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl EdgeError {
    pub(crate) fn config(endpoint: &str, reason: impl std::fmt::Display) -> Self {
        Self::ConfigFetch {
            endpoint: endpoint.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Whether the failure was caused by an upstream service.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::ConfigFetch { .. } | Self::VariantFetch { .. })
    }
}

/// Failures inside the document rewriter.
#[derive(thiserror::Error, Debug)]
pub enum TransformError {
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid attribute name `{name}`: {reason}")]
    Attribute { name: String, reason: String },

    #[error("rewriter failed: {0}")]
    Rewriter(String),
}
