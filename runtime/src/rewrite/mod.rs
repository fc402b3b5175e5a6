// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! Element-level document rewriting.
//!
//! Rules pair a CSS selector with an [`ElementHandler`]. Handlers only see
//! the [`RewritableElement`] trait, so the rule set does not depend on the
//! HTML engine underneath; [`engine`] adapts it to `lol_html`, and
//! [`stream`] drives that engine over a streaming response body.
//!
//! The request's [`Assignment`] is passed into every handler call. No rule
//! reads the arm from anywhere else, so all rules in one pass agree.

pub mod engine;
pub mod rules;
pub mod stream;

use crate::assignment::Assignment;
use crate::error::TransformError;
use lol_html::Selector;
use std::sync::Arc;

pub use engine::{rewrite_document, DocumentRewriter};
pub use rules::default_rules;
pub use stream::transform;

/// The view of a matched element that handlers are allowed to touch.
pub trait RewritableElement {
    fn attribute(&self, name: &str) -> Option<String>;

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), TransformError>;

    /// Replace the element's children with escaped text.
    fn set_inner_text(&mut self, text: &str);
}

/// Called once for every element matching the rule's selector.
pub trait ElementHandler: Send + Sync {
    fn element(
        &self,
        element: &mut dyn RewritableElement,
        assignment: Assignment,
    ) -> Result<(), TransformError>;
}

/// A selector bound to a handler.
#[derive(Clone)]
pub struct RewriteRule {
    selector: String,
    handler: Arc<dyn ElementHandler>,
}

impl RewriteRule {
    pub fn new(selector: impl Into<String>, handler: impl ElementHandler + 'static) -> Self {
        Self {
            selector: selector.into(),
            handler: Arc::new(handler),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn handler(&self) -> &Arc<dyn ElementHandler> {
        &self.handler
    }

    /// Check that the selector is one the engine can match.
    pub fn validate(&self) -> Result<(), TransformError> {
        self.selector
            .parse::<Selector>()
            .map(drop)
            .map_err(|e| TransformError::Selector {
                selector: self.selector.clone(),
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Debug for RewriteRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RewriteRule")
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// Ordered collection of rules applied in one pass.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<RewriteRule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule. Selectors are checked by [`RuleSet::validate`].
    pub fn on(mut self, selector: impl Into<String>, handler: impl ElementHandler + 'static) -> Self {
        self.rules.push(RewriteRule::new(selector, handler));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &RewriteRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Fail on the first selector the engine cannot match.
    pub fn validate(&self) -> Result<(), TransformError> {
        self.rules.iter().try_for_each(RewriteRule::validate)
    }
}
