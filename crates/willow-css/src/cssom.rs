//! The object model a parsed sheet produces.
//!
//! [§ 5.3.2 Parse a stylesheet](https://www.w3.org/TR/css-syntax-3/#parse-stylesheet)
//!
//! A [`SourceSheet`] is the ordered rule list of one source file. Style
//! rules carry an already-parsed selector (with cached specificity) and a
//! processed [`Style`]; `@media` nests a whole sheet behind a query;
//! `@import` and `@page` are accepted but inert here (the host resolves
//! imports, nothing prints).

use crate::media::{MediaQuery, MediaValue};
use crate::selector::{Selector, Specificity};
use crate::style::Style;

/// A style rule: selector plus its processed declarations.
#[derive(Debug, Clone)]
pub struct StyleRule {
    /// The parsed selector.
    pub selector: Selector,
    /// The selector's specificity (cached at parse time).
    pub specificity: Specificity,
    /// The processed declaration block.
    pub style: Style,
}

/// An `@media` rule: a query gating a nested sheet.
#[derive(Debug, Clone)]
pub struct MediaRule {
    /// The media query tree.
    pub query: MediaQuery,
    /// The rules inside the block.
    pub content: SourceSheet,
}

/// One rule of a sheet.
#[derive(Debug, Clone)]
pub enum Rule {
    /// A style rule.
    Style(StyleRule),
    /// An `@media` block.
    Media(MediaRule),
    /// An `@import` prelude (the referenced URL); resolution is the
    /// host's concern.
    Import(String),
    /// An `@page` rule, accepted and ignored.
    Page,
}

/// An ordered list of rules from one source.
#[derive(Debug, Clone, Default)]
pub struct SourceSheet {
    /// The rules in source order.
    pub rules: Vec<Rule>,
}

impl SourceSheet {
    /// An empty sheet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The style rules active for the given viewport, media blocks
    /// flattened, in source order.
    #[must_use]
    pub fn active_rules(&self, media: MediaValue) -> Vec<&StyleRule> {
        let mut out = Vec::new();
        self.collect_active(media, &mut out);
        out
    }

    fn collect_active<'a>(&'a self, media: MediaValue, out: &mut Vec<&'a StyleRule>) {
        for rule in &self.rules {
            match rule {
                Rule::Style(style_rule) => out.push(style_rule),
                Rule::Media(media_rule) if media_rule.query.matches(media) => {
                    media_rule.content.collect_active(media, out);
                }
                Rule::Media(_) | Rule::Import(_) | Rule::Page => {}
            }
        }
    }
}
