//! Inline layout model: font metrics, inline items, and line boxes.
//!
//! [§ 9.4.2 Inline formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#inline-formatting)
//!
//! "In an inline formatting context, boxes are laid out horizontally, one
//! after the other, beginning at the top of a containing block."
//!
//! Text flattens into one inline item per whitespace-separated word, each
//! carrying a trailing-whitespace flag derived from the source; atomic
//! inline elements (`<br>`, images, form controls) participate as single
//! opaque items.

use serde::Serialize;
use willow_dom::NodeId;

use crate::layout::box_model::Rect;
use crate::style::ComputedStyle;
use crate::values::{Calculator, ComputedValue, FontStyleKind};

/// A font lookup request: the core's view of the host's font provider.
///
/// Mirrors `find_font(family_list, size, style, weight)` from the host
/// interface; implementations fall back through the family list and must
/// end in a guaranteed system font.
#[derive(Debug, Clone, Copy)]
pub struct FontQuery<'a> {
    /// Font families in preference order.
    pub families: &'a [String],
    /// Font size in px.
    pub size: f32,
    /// Numeric weight (400 = normal, 700 = bold).
    pub weight: f32,
    /// Style (normal/italic/oblique).
    pub style: FontStyleKind,
}

impl<'a> FontQuery<'a> {
    /// Build a query from a computed style.
    #[must_use]
    pub fn from_style(style: &'a ComputedStyle) -> Self {
        let families: &[String] = match style.get("font-family") {
            Some(ComputedValue::Families(f)) => f.as_slice(),
            _ => &[],
        };
        let weight = match style.get("font-weight") {
            Some(ComputedValue::Number(w)) => *w,
            _ => 400.0,
        };
        let kind = match style.get("font-style") {
            Some(ComputedValue::FontStyle(fs)) => fs.kind,
            _ => FontStyleKind::Normal,
        };
        Self {
            families,
            size: style.font_size(),
            weight,
            style: kind,
        }
    }
}

/// Font metrics interface for text measurement during layout.
///
/// [§ 10.8 Line height calculations](https://www.w3.org/TR/CSS2/visudet.html#line-height)
///
/// "CSS assumes that every font has font metrics that specify a
/// characteristic height above the baseline and a depth below it."
///
/// Implementors provide the per-glyph advance widths and natural line
/// heights needed for line breaking and fragment placement.
pub trait FontMetrics {
    /// Measure the total advance width of a text string.
    fn text_width(&self, query: &FontQuery, text: &str) -> f32;

    /// The font's natural line height (`line-height: normal`).
    fn line_height(&self, query: &FontQuery) -> f32;

    /// The advance width of a space glyph (the `word-spacing: normal`
    /// reference).
    fn space_width(&self, query: &FontQuery) -> f32 {
        self.text_width(query, " ")
    }
}

/// Approximate font metrics using fixed ratios.
///
/// The average advance width of Latin glyphs in a proportional font is
/// roughly 0.6× the font size; line height uses 1.2×, the upper end of
/// the spec's recommended range for `line-height: normal`. Used as the
/// final fallback and in tests, where its exact predictability is the
/// point.
pub struct ApproximateFontMetrics;

impl FontMetrics for ApproximateFontMetrics {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, query: &FontQuery, text: &str) -> f32 {
        const CHAR_WIDTH_RATIO: f32 = 0.6;
        text.chars().count() as f32 * query.size * CHAR_WIDTH_RATIO
    }

    fn line_height(&self, query: &FontQuery) -> f32 {
        const LINE_HEIGHT_RATIO: f32 = 1.2;
        query.size * LINE_HEIGHT_RATIO
    }
}

/// The used line height of an element.
///
/// `normal` → the font's natural linesize; a bare number multiplies the
/// font size; percentages resolve against the font size; lengths are used
/// as-is.
#[must_use]
pub fn resolved_line_height(style: &ComputedStyle, metrics: &dyn FontMetrics) -> f32 {
    let query = FontQuery::from_style(style);
    let natural = metrics.line_height(&query);
    let font_size = style.font_size();
    match style.get("line-height") {
        Some(ComputedValue::Number(n)) => n * font_size,
        Some(value) => Calculator::default()
            .resolve(value, Some(natural), Some(font_size))
            .unwrap_or(natural),
        None => natural,
    }
}

/// The used word spacing of an element: the space glyph's width plus the
/// `word-spacing` value (`normal` adds nothing; percentages resolve
/// against the space width).
#[must_use]
pub fn resolved_word_spacing(style: &ComputedStyle, metrics: &dyn FontMetrics) -> f32 {
    let query = FontQuery::from_style(style);
    let space = metrics.space_width(&query);
    let extra = style.get("word-spacing").map_or(0.0, |value| {
        Calculator::default()
            .resolve(value, Some(0.0), Some(space))
            .unwrap_or(0.0)
    });
    space + extra
}

/// What one inline item is.
#[derive(Debug, Clone, Serialize)]
pub enum InlineContent {
    /// One whitespace-separated word of a text node.
    Word {
        /// The word itself.
        text: String,
        /// The element whose style measures and paints this word (the
        /// text node's parent).
        owner: NodeId,
    },
    /// An atomic inline element participating as one opaque box.
    Element(NodeId),
}

/// An atomic unit of inline layout.
#[derive(Debug, Clone, Serialize)]
pub struct InlineItem {
    /// Position and size in the container's local coordinate space.
    pub rect: Rect,
    /// Absolute position after the positioning pass.
    pub abs_rect: Rect,
    /// The item's content.
    pub content: InlineContent,
    /// Whether the source had whitespace after this item (adds word
    /// spacing to the advance).
    pub whitespace: bool,
}

/// A finished inline layout: items with line positions applied, and the
/// total height (final y plus the last line's height).
#[derive(Debug, Clone, Default, Serialize)]
pub struct InlineLayout {
    /// The laid-out items.
    pub items: Vec<InlineItem>,
    /// Height of the inline area.
    pub height: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn style_with(key: &str, value: ComputedValue) -> ComputedStyle {
        let mut style = ComputedStyle::empty();
        style.insert("font-size", ComputedValue::Length(20.0));
        style.insert(key, value);
        style
    }

    #[test]
    fn line_height_forms() {
        let metrics = ApproximateFontMetrics;
        // normal → natural linesize (1.2 × 20)
        let style = style_with("line-height", ComputedValue::Normal);
        assert!((resolved_line_height(&style, &metrics) - 24.0).abs() < 1e-4);
        // number → n × font-size
        let style = style_with("line-height", ComputedValue::Number(1.5));
        assert!((resolved_line_height(&style, &metrics) - 30.0).abs() < 1e-4);
        // percentage → against font-size
        let style = style_with("line-height", ComputedValue::Percentage(200.0));
        assert!((resolved_line_height(&style, &metrics) - 40.0).abs() < 1e-4);
        // length → as-is
        let style = style_with("line-height", ComputedValue::Length(17.0));
        assert!((resolved_line_height(&style, &metrics) - 17.0).abs() < 1e-4);
    }

    #[test]
    fn word_spacing_adds_to_space_width() {
        let metrics = ApproximateFontMetrics;
        let space = 0.6 * 20.0;
        // normal → the space width itself
        let style = style_with("word-spacing", ComputedValue::Normal);
        assert!((resolved_word_spacing(&style, &metrics) - space).abs() < 1e-4);
        // a length adds
        let style = style_with("word-spacing", ComputedValue::Length(5.0));
        assert!((resolved_word_spacing(&style, &metrics) - (space + 5.0)).abs() < 1e-4);
        // a percentage resolves against the space width
        let style = style_with("word-spacing", ComputedValue::Percentage(50.0));
        assert!((resolved_word_spacing(&style, &metrics) - (space * 1.5)).abs() < 1e-4);
    }
}
