// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! `lol_html` backend for the rule set.
//!
//! [`DocumentRewriter`] is push-based: feed it chunks as they arrive and it
//! emits rewritten bytes to the sink without holding the whole document.
//! It uses the `Send` handler flavour and owns its handlers, so a rewriter
//! can live inside a spawned task or a boxed body stream.

use super::{RewritableElement, RuleSet};
use crate::assignment::Assignment;
use crate::error::TransformError;
use lol_html::html_content::ContentType;
use lol_html::send::{Element, HtmlRewriter, Settings};
use lol_html::{element, OutputSink};
use std::sync::Arc;

/// Adapter from a `lol_html` element to [`RewritableElement`].
struct LolElement<'a, 'r, 't> {
    inner: &'a mut Element<'r, 't>,
}

impl RewritableElement for LolElement<'_, '_, '_> {
    fn attribute(&self, name: &str) -> Option<String> {
        self.inner.get_attribute(name)
    }

    fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), TransformError> {
        self.inner
            .set_attribute(name, value)
            .map_err(|e| TransformError::Attribute {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }

    fn set_inner_text(&mut self, text: &str) {
        self.inner.set_inner_content(text, ContentType::Text);
    }
}

/// One streaming rewrite pass bound to a single request's arm.
pub struct DocumentRewriter<O: OutputSink> {
    inner: HtmlRewriter<'static, O>,
}

impl<O: OutputSink> DocumentRewriter<O> {
    /// Register every rule of `rules` for `assignment` and write output to `sink`.
    ///
    /// Fails if any selector is not understood by the engine.
    pub fn new(rules: &RuleSet, assignment: Assignment, sink: O) -> Result<Self, TransformError> {
        rules.validate()?;
        let mut handlers = Vec::with_capacity(rules.len());

        for rule in rules.iter() {
            let handler = Arc::clone(rule.handler());
            handlers.push(element!(rule.selector(), move |el| {
                handler.element(&mut LolElement { inner: el }, assignment)?;
                Ok(())
            }));
        }

        let inner = HtmlRewriter::new(
            Settings {
                element_content_handlers: handlers,
                ..Settings::new_send()
            },
            sink,
        );

        Ok(Self { inner })
    }

    /// Feed the next chunk of the source document.
    pub fn write(&mut self, chunk: &[u8]) -> Result<(), TransformError> {
        self.inner
            .write(chunk)
            .map_err(|e| TransformError::Rewriter(e.to_string()))
    }

    /// Flush whatever the engine is still holding back.
    pub fn end(self) -> Result<(), TransformError> {
        self.inner
            .end()
            .map_err(|e| TransformError::Rewriter(e.to_string()))
    }
}

/// Rewrite a complete in-memory document.
pub fn rewrite_document(
    rules: &RuleSet,
    html: &[u8],
    assignment: Assignment,
) -> Result<Vec<u8>, TransformError> {
    let mut output = Vec::with_capacity(html.len());
    let mut rewriter = DocumentRewriter::new(rules, assignment, |chunk: &[u8]| {
        output.extend_from_slice(chunk)
    })?;
    rewriter.write(html)?;
    rewriter.end()?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::rules::*;
    use crate::rewrite::{default_rules, ElementHandler};
    use scraper::{Html, Selector as Css};

    const PAGE: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Variant 1</title></head>
  <body>
    <h1 id="title">Variant 1</h1>
    <p id="description">This is variant one of the take home project!</p>
    <a id="url" href="https://cloudflare.com/workers">Return to cloudflare.com</a>
    <p class="footer">unchanged</p>
  </body>
</html>"#;

    fn text(doc: &Html, css: &str) -> String {
        let selector = Css::parse(css).unwrap();
        doc.select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
            .unwrap_or_default()
    }

    fn attr(doc: &Html, css: &str, name: &str) -> Option<String> {
        let selector = Css::parse(css).unwrap();
        doc.select(&selector)
            .next()
            .and_then(|el| el.value().attr(name).map(str::to_string))
    }

    fn rewrite(html: &str, arm: Assignment) -> String {
        let out = rewrite_document(&default_rules(), html.as_bytes(), arm).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_arm_a_content() {
        let doc = Html::parse_document(&rewrite(PAGE, Assignment::ArmA));
        assert_eq!(text(&doc, "title"), PAGE_TITLE);
        assert_eq!(text(&doc, "h1#title"), HEADLINE_A);
        assert_eq!(text(&doc, "p#description"), DESCRIPTION_A);
        assert_eq!(text(&doc, "a#url"), LINK_LABEL);
        assert_eq!(
            attr(&doc, "a#url", "href").as_deref(),
            Some("https://www.paridhikhaitan.me/workers")
        );
        assert_eq!(text(&doc, "p.footer"), "unchanged");
    }

    #[test]
    fn test_arm_b_content() {
        let doc = Html::parse_document(&rewrite(PAGE, Assignment::ArmB));
        assert_eq!(text(&doc, "title"), PAGE_TITLE);
        assert_eq!(text(&doc, "h1#title"), HEADLINE_B);
        assert_eq!(text(&doc, "p#description"), DESCRIPTION_B);
    }

    #[test]
    fn test_original_text_is_replaced() {
        let out = rewrite(PAGE, Assignment::ArmA);
        assert!(!out.contains("Variant 1"));
        assert!(!out.contains("variant one"));
        assert!(!out.contains("https://cloudflare.com"));
    }

    #[test]
    fn test_anchor_without_href_is_emitted_unchanged() {
        let html = r#"<html><body><a id="url">Return</a></body></html>"#;
        assert_eq!(rewrite(html, Assignment::ArmA), html);
    }

    #[test]
    fn test_unmatched_elements_pass_through() {
        let html = r#"<html><body><h1>plain</h1><p id="other">x</p><a href="https://cloudflare.com/">y</a></body></html>"#;
        assert_eq!(rewrite(html, Assignment::ArmB), html);
    }

    #[test]
    fn test_transform_is_idempotent() {
        for arm in Assignment::ALL {
            let once = rewrite(PAGE, arm);
            let twice = rewrite(&once, arm);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_chunked_input_matches_whole_document() {
        let rules = default_rules();
        let whole = rewrite_document(&rules, PAGE.as_bytes(), Assignment::ArmB).unwrap();

        for size in [1, 3, 7, 64] {
            let mut output = Vec::new();
            let mut rewriter =
                DocumentRewriter::new(&rules, Assignment::ArmB, |c: &[u8]| output.extend_from_slice(c))
                    .unwrap();
            for chunk in PAGE.as_bytes().chunks(size) {
                rewriter.write(chunk).unwrap();
            }
            rewriter.end().unwrap();
            assert_eq!(output, whole, "chunk size {size}");
        }
    }

    #[test]
    fn test_invalid_selector_is_rejected() {
        let rules = RuleSet::new().on("h1[[", StaticText::new("x"));
        let err = rewrite_document(&rules, PAGE.as_bytes(), Assignment::ArmA).unwrap_err();
        assert!(matches!(err, TransformError::Selector { .. }));
    }

    struct Failing;

    impl ElementHandler for Failing {
        fn element(&self, _: &mut dyn RewritableElement, _: Assignment) -> Result<(), TransformError> {
            Err(TransformError::Rewriter("boom".to_string()))
        }
    }

    #[test]
    fn test_handler_error_aborts_rewrite() {
        let rules = RuleSet::new().on("h1", Failing);
        let err = rewrite_document(&rules, PAGE.as_bytes(), Assignment::ArmA).unwrap_err();
        assert!(matches!(err, TransformError::Rewriter(_)));
    }
}
