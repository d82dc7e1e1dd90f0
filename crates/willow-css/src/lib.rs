//! CSS tokenizer, selector matching, cascade, style computation, and flow
//! layout for the Willow rendering engine.
//!
//! # Scope
//!
//! This crate implements the style-and-layout pipeline:
//! - **CSS Tokenizer** ([§ 4 Tokenization](https://www.w3.org/TR/css-syntax-3/#tokenization))
//! - **Stylesheet Parser** ([§ 5 Parsing](https://www.w3.org/TR/css-syntax-3/#parsing))
//!   with `@media` blocks, `!important`, custom properties, and
//!   skip-to-boundary error recovery
//! - **Selectors** ([Selectors Level 4](https://www.w3.org/TR/selectors-4/)):
//!   combinators, attribute operators, state pseudo-classes, `:not()`,
//!   additive specificity
//! - **Value model** ([CSS Values Level 4](https://www.w3.org/TR/css-values-4/)):
//!   canonicalized dimensions, colors in all common syntaxes, `calc()`
//!   with deferred percentage arithmetic
//! - **Cascade and computation** ([CSS Cascading Level 4](https://www.w3.org/TR/css-cascade-4/)):
//!   origin/importance/specificity ordering, the four global keywords,
//!   `var()` substitution, computed-style interning
//! - **Flow layout** ([CSS 2.1 § 9](https://www.w3.org/TR/CSS2/visuren.html)):
//!   the box model with both box sizings, block stacking with margin
//!   collapsing, inline line breaking with `text-align`, hit testing,
//!   and display-list paint output
//!
//! The crate is pure: no I/O, no host types. Fonts come in through the
//! [`FontMetrics`] trait, pixels go out as a [`DisplayList`].

pub mod cssom;
pub mod error;
pub mod layout;
pub mod media;
pub mod paint;
pub mod parser;
pub mod selector;
pub mod style;
pub mod tokenizer;
pub mod values;

// Re-exports for convenience
pub use cssom::{MediaRule, Rule, SourceSheet, StyleRule};
pub use error::{BugError, InvalidSelector};
pub use layout::{
    ApproximateFontMetrics, CssBox, FontMetrics, FontQuery, LayoutInput, LayoutTree, hit_test,
    layout_document,
};
pub use media::MediaQuery;
pub use paint::{DisplayCommand, DisplayList, build_display_list};
pub use parser::{parse_inline_style, parse_sheet};
pub use selector::{Selector, Specificity, parse_selector};
pub use style::cascade::cascaded_styles;
pub use style::compute::{StyleEnv, compute_element, compute_tree};
pub use style::intern::StyleInterner;
pub use style::{ComputedStyle, Style};
pub use values::{Color, ComputedValue};

use willow_dom::{DomTree, NodeId, NodeType};

/// [HTML § 4.2.6 The style element](https://html.spec.whatwg.org/multipage/semantics.html#the-style-element)
///
/// Extract CSS text from all `<style>` elements in a tree.
#[must_use]
pub fn extract_style_content(tree: &DomTree) -> String {
    let mut css = String::new();
    collect_style_content(tree, tree.root(), &mut css);
    css
}

/// Recursively collect CSS text from style elements.
fn collect_style_content(tree: &DomTree, id: NodeId, css: &mut String) {
    match tree.get(id).map(|n| &n.node_type) {
        Some(NodeType::Element(data)) if data.tag_name.eq_ignore_ascii_case("style") => {
            for &child_id in tree.children(id) {
                if let Some(text) = tree.as_text(child_id) {
                    css.push_str(text);
                    css.push('\n');
                }
            }
        }
        _ => {
            for &child_id in tree.children(id) {
                collect_style_content(tree, child_id, css);
            }
        }
    }
}
