// Copyright 2026 AB Edge Contributors
// SPDX-License-Identifier: Apache-2.0

//! The rewrite rules applied to every arm document.

use super::{ElementHandler, RewritableElement, RuleSet};
use crate::assignment::Assignment;
use crate::error::TransformError;

pub const PAGE_TITLE: &str = "Paridhi's Take-Home";

pub const HEADLINE_A: &str = "I'm Paridhi, Student @UCSD";
pub const HEADLINE_B: &str = "I'm Paridhi, an advocate for diversity";

pub const DESCRIPTION_A: &str = "I'm really passionate about the intersection of Computer Science and Design and want to better the world one line of code at a time.";
pub const DESCRIPTION_B: &str = "I work with WIC (Women in Computing), ABLE (Anita B. Org Leadership) and GWC (Girls' Who Code) to promote representation in CS.";

pub const LINK_LABEL: &str = "Visit My Website :)";
pub const UPSTREAM_ORIGIN: &str = "https://cloudflare.com";
pub const DESTINATION_ORIGIN: &str = "https://www.paridhikhaitan.me";

/// `title`, `h1#title`, `p#description` and `a#url`.
pub fn default_rules() -> RuleSet {
    RuleSet::new()
        .on("title", StaticText::new(PAGE_TITLE))
        .on("h1#title", ArmText::new(HEADLINE_A, HEADLINE_B))
        .on("p#description", ArmText::new(DESCRIPTION_A, DESCRIPTION_B))
        .on(
            "a#url",
            LinkRewriter::new("href", UPSTREAM_ORIGIN, DESTINATION_ORIGIN, LINK_LABEL),
        )
}

/// Replaces inner content with the same text for both arms.
#[derive(Debug, Clone)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl ElementHandler for StaticText {
    fn element(&self, element: &mut dyn RewritableElement, _: Assignment) -> Result<(), TransformError> {
        element.set_inner_text(&self.text);
        Ok(())
    }
}

/// Replaces inner content with per-arm text.
#[derive(Debug, Clone)]
pub struct ArmText {
    arm_a: String,
    arm_b: String,
}

impl ArmText {
    pub fn new(arm_a: impl Into<String>, arm_b: impl Into<String>) -> Self {
        Self {
            arm_a: arm_a.into(),
            arm_b: arm_b.into(),
        }
    }

    pub fn text_for(&self, assignment: Assignment) -> &str {
        match assignment {
            Assignment::ArmA => &self.arm_a,
            Assignment::ArmB => &self.arm_b,
        }
    }
}

impl ElementHandler for ArmText {
    fn element(
        &self,
        element: &mut dyn RewritableElement,
        assignment: Assignment,
    ) -> Result<(), TransformError> {
        element.set_inner_text(self.text_for(assignment));
        Ok(())
    }
}

/// Points a link at another origin and relabels it.
///
/// Elements without the attribute (or with an empty one) are left alone.
/// The origin swap only applies when the value starts with `from` on a
/// path boundary; the label is replaced either way.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    attribute: String,
    from: String,
    to: String,
    label: String,
}

impl LinkRewriter {
    pub fn new(
        attribute: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            from: from.into(),
            to: to.into(),
            label: label.into(),
        }
    }

    /// `value` with the origin swapped, or `None` if it points elsewhere.
    pub fn rewrite_target(&self, value: &str) -> Option<String> {
        let rest = value.strip_prefix(&self.from)?;
        if rest.is_empty() || rest.starts_with(['/', '?', '#']) {
            Some(format!("{}{rest}", self.to))
        } else {
            None
        }
    }
}

impl ElementHandler for LinkRewriter {
    fn element(&self, element: &mut dyn RewritableElement, _: Assignment) -> Result<(), TransformError> {
        let Some(value) = element.attribute(&self.attribute).filter(|v| !v.is_empty()) else {
            return Ok(());
        };

        element.set_inner_text(&self.label);
        if let Some(target) = self.rewrite_target(&value) {
            element.set_attribute(&self.attribute, &target)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    /// Engine-free element used to exercise handlers directly.
    struct FakeElement {
        attributes: BTreeMap<String, String>,
        text: Option<String>,
    }

    impl FakeElement {
        fn new(attributes: &[(&str, &str)]) -> Self {
            Self {
                attributes: attributes
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
                text: None,
            }
        }
    }

    impl RewritableElement for FakeElement {
        fn attribute(&self, name: &str) -> Option<String> {
            self.attributes.get(name).cloned()
        }

        fn set_attribute(&mut self, name: &str, value: &str) -> Result<(), TransformError> {
            self.attributes.insert(name.to_string(), value.to_string());
            Ok(())
        }

        fn set_inner_text(&mut self, text: &str) {
            self.text = Some(text.to_string());
        }
    }

    fn link_rule() -> LinkRewriter {
        LinkRewriter::new("href", UPSTREAM_ORIGIN, DESTINATION_ORIGIN, LINK_LABEL)
    }

    #[test]
    fn test_static_text_ignores_arm() {
        let rule = StaticText::new(PAGE_TITLE);
        for arm in Assignment::ALL {
            let mut el = FakeElement::new(&[]);
            rule.element(&mut el, arm).unwrap();
            assert_eq!(el.text.as_deref(), Some(PAGE_TITLE));
        }
    }

    #[test]
    fn test_arm_text_follows_assignment() {
        let rule = ArmText::new(HEADLINE_A, HEADLINE_B);
        let mut el = FakeElement::new(&[("id", "title")]);
        rule.element(&mut el, Assignment::ArmA).unwrap();
        assert_eq!(el.text.as_deref(), Some(HEADLINE_A));
        rule.element(&mut el, Assignment::ArmB).unwrap();
        assert_eq!(el.text.as_deref(), Some(HEADLINE_B));
    }

    #[test]
    fn test_link_swaps_origin_and_label() {
        let mut el = FakeElement::new(&[("id", "url"), ("href", "https://cloudflare.com/x")]);
        link_rule().element(&mut el, Assignment::ArmB).unwrap();
        assert_eq!(el.attributes["href"], "https://www.paridhikhaitan.me/x");
        assert_eq!(el.text.as_deref(), Some(LINK_LABEL));
    }

    #[test]
    fn test_link_without_href_is_untouched() {
        let mut el = FakeElement::new(&[("id", "url")]);
        link_rule().element(&mut el, Assignment::ArmA).unwrap();
        assert_eq!(el.text, None);
        assert!(!el.attributes.contains_key("href"));

        let mut el = FakeElement::new(&[("id", "url"), ("href", "")]);
        link_rule().element(&mut el, Assignment::ArmA).unwrap();
        assert_eq!(el.text, None);
    }

    #[test]
    fn test_link_to_other_origin_keeps_href() {
        let mut el = FakeElement::new(&[("href", "https://example.com/cloudflare.com")]);
        link_rule().element(&mut el, Assignment::ArmA).unwrap();
        assert_eq!(el.attributes["href"], "https://example.com/cloudflare.com");
        assert_eq!(el.text.as_deref(), Some(LINK_LABEL));
    }

    #[test]
    fn test_rewrite_target_respects_origin_boundary() {
        let rule = link_rule();
        assert_eq!(
            rule.rewrite_target("https://cloudflare.com").as_deref(),
            Some("https://www.paridhikhaitan.me")
        );
        assert_eq!(
            rule.rewrite_target("https://cloudflare.com?ref=ab#top").as_deref(),
            Some("https://www.paridhikhaitan.me?ref=ab#top")
        );
        assert_eq!(rule.rewrite_target("https://cloudflare.community/t/1"), None);
        // Already rewritten: a second pass changes nothing.
        assert_eq!(rule.rewrite_target("https://www.paridhikhaitan.me/x"), None);
    }

    #[test]
    fn test_default_rules_selectors() {
        let rules = default_rules();
        let selectors: Vec<_> = rules.iter().map(|r| r.selector()).collect();
        assert_eq!(selectors, ["title", "h1#title", "p#description", "a#url"]);
    }
}
