//! The CSS box model.
//!
//! [CSS Box Model Module Level 3](https://www.w3.org/TR/css-box-3/)
//!
//! A [`CssBox`] stores `width`/`height` in its own sizing's coordinate
//! space (`content-box` → content area, `border-box` → border box) and
//! converts between the content, border, and outer (margin) boxes by
//! summing the intervening edges, negative when shrinking.

use serde::Serialize;

use crate::error::BugError;
use crate::style::{BoxSizing, ComputedStyle, MARGIN_KEYS, PADDING_KEYS};
use crate::values::{Calculator, ComputedValue};

/// Sentinel meaning "height not resolved yet" (`height: auto` awaiting
/// children).
pub const UNRESOLVED: f32 = -1.0;

/// A rectangle positioned in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    /// Horizontal position of the top-left corner.
    pub x: f32,
    /// Vertical position of the top-left corner.
    pub y: f32,
    /// Width of the rectangle.
    pub width: f32,
    /// Height of the rectangle.
    pub height: f32,
}

impl Rect {
    /// Whether the point lies inside (edges inclusive on the top/left).
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    /// The rectangle moved by an offset.
    #[must_use]
    pub fn translated(&self, dx: f32, dy: f32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Edge sizes for padding, border, or margin.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct EdgeSizes {
    /// Top edge size.
    pub top: f32,
    /// Right edge size.
    pub right: f32,
    /// Bottom edge size.
    pub bottom: f32,
    /// Left edge size.
    pub left: f32,
}

impl EdgeSizes {
    /// From a `[top, right, bottom, left]` tuple.
    #[must_use]
    pub fn from_sides(sides: [f32; 4]) -> Self {
        Self {
            top: sides[0],
            right: sides[1],
            bottom: sides[2],
            left: sides[3],
        }
    }

    /// left + right.
    #[must_use]
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    /// top + bottom.
    #[must_use]
    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

/// The nested box types, innermost out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum BoxType {
    /// The content area.
    Content,
    /// Content + padding + border.
    Border,
    /// Border box + margin (the margin edge).
    Outer,
}

impl From<BoxSizing> for BoxType {
    fn from(sizing: BoxSizing) -> Self {
        match sizing {
            BoxSizing::ContentBox => Self::Content,
            BoxSizing::BorderBox => Self::Border,
        }
    }
}

/// An element's box geometry.
///
/// `x`/`y`/`width`/`height` are in the coordinate space of `sizing`'s box
/// type; the conversion methods move between spaces. All dimensions are
/// non-negative except `x`/`y` and the [`UNRESOLVED`] height sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CssBox {
    /// Which box `width`/`height`/`x`/`y` describe.
    pub sizing: BoxType,
    /// Horizontal position of the sizing box.
    pub x: f32,
    /// Vertical position of the sizing box.
    pub y: f32,
    /// Width of the sizing box.
    pub width: f32,
    /// Height of the sizing box, or [`UNRESOLVED`].
    pub height: f32,
    /// Margin edges.
    pub margin: EdgeSizes,
    /// Border edges (coerced ≥ 0; zero when the border style hides).
    pub border: EdgeSizes,
    /// Padding edges.
    pub padding: EdgeSizes,
}

impl Default for CssBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl CssBox {
    /// A zero-sized content box.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            sizing: BoxType::Content,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            margin: EdgeSizes::default(),
            border: EdgeSizes::default(),
            padding: EdgeSizes::default(),
        }
    }

    /// Whether the height still awaits the children's layout.
    #[must_use]
    pub fn height_unresolved(&self) -> bool {
        (self.height - UNRESOLVED).abs() < f32::EPSILON
    }

    /// The `(left, top)` edge sums between two box types, signed from
    /// `from` to `to` (positive when `to` is further out).
    fn edge_offsets(&self, from: BoxType, to: BoxType) -> (f32, f32) {
        if from == to {
            return (0.0, 0.0);
        }
        if from > to {
            let (l, t) = self.edge_offsets(to, from);
            return (-l, -t);
        }
        let mut left = 0.0;
        let mut top = 0.0;
        if from == BoxType::Content {
            left += self.padding.left + self.border.left;
            top += self.padding.top + self.border.top;
        }
        if to == BoxType::Outer {
            left += self.margin.left;
            top += self.margin.top;
        }
        (left, top)
    }

    /// The `(horizontal, vertical)` size growth between two box types,
    /// signed from `from` to `to`.
    fn size_offsets(&self, from: BoxType, to: BoxType) -> (f32, f32) {
        if from == to {
            return (0.0, 0.0);
        }
        if from > to {
            let (h, v) = self.size_offsets(to, from);
            return (-h, -v);
        }
        let mut horizontal = 0.0;
        let mut vertical = 0.0;
        if from == BoxType::Content {
            horizontal += self.padding.horizontal() + self.border.horizontal();
            vertical += self.padding.vertical() + self.border.vertical();
        }
        if to == BoxType::Outer {
            horizontal += self.margin.horizontal();
            vertical += self.margin.vertical();
        }
        (horizontal, vertical)
    }

    /// Width of the given box type.
    #[must_use]
    pub fn width_of(&self, t: BoxType) -> f32 {
        let (h, _) = self.size_offsets(self.sizing, t);
        (self.width + h).max(0.0)
    }

    /// Height of the given box type ([`UNRESOLVED`] passes through).
    #[must_use]
    pub fn height_of(&self, t: BoxType) -> f32 {
        if self.height_unresolved() {
            return UNRESOLVED;
        }
        let (_, v) = self.size_offsets(self.sizing, t);
        (self.height + v).max(0.0)
    }

    /// The rectangle of the given box type.
    #[must_use]
    pub fn rect_of(&self, t: BoxType) -> Rect {
        let (l, top) = self.edge_offsets(self.sizing, t);
        Rect {
            x: self.x - l,
            y: self.y - top,
            width: self.width_of(t),
            height: self.height_of(t),
        }
    }

    /// Set the position of the given box type (stored converted into the
    /// sizing space).
    pub fn set_position(&mut self, t: BoxType, x: f32, y: f32) {
        let (l, top) = self.edge_offsets(self.sizing, t);
        self.x = x + l;
        self.y = y + top;
    }

    /// Translate the box (coordinate-space independent).
    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }

    /// Resolve an auto height to the given content height.
    pub fn set_content_height(&mut self, content_height: f32) {
        let (_, v) = self.size_offsets(BoxType::Content, self.sizing);
        self.height = (content_height + v).max(0.0);
    }

    /// Set the content width (converted into the sizing space).
    pub fn set_content_width(&mut self, content_width: f32) {
        let (h, _) = self.size_offsets(BoxType::Content, self.sizing);
        self.width = (content_width + h).max(0.0);
    }
}

/// Build a box from a computed style.
///
/// `given_outer_width` is the horizontal space the box may occupy (its
/// outer width when `width: auto`). Percentages resolve against
/// `parent_width` (margins/paddings too) and `parent_height` (the height).
/// When `width` is a resolved value, the horizontal margins absorb the
/// remaining space: both `auto` split it evenly, a single `auto` takes all
/// of it, and resolved values are taken as-is. Vertical margins never
/// absorb slack.
///
/// Returns the box and whether its height is still [`UNRESOLVED`]; the
/// caller resolves it with [`CssBox::set_content_height`] once the
/// children are laid out.
///
/// # Errors
///
/// Returns [`BugError`] when the style map violates registry invariants
/// (e.g. a percentage border width).
pub fn make_box(
    given_outer_width: f32,
    style: &ComputedStyle,
    parent_width: f32,
    parent_height: f32,
) -> Result<(CssBox, bool), BugError> {
    let calc = Calculator::new(parent_width);

    let padding = EdgeSizes::from_sides(calc.resolve4(
        style.sides(PADDING_KEYS),
        Some(0.0),
        Some(parent_width),
    )?);
    // border widths allow neither auto nor percentage
    let border_sides = calc.resolve4(style.sides(crate::style::BORDER_WIDTH_KEYS), None, None)?;
    let border = EdgeSizes::from_sides(border_sides.map(|w| w.max(0.0)));

    let sizing = BoxType::from(style.box_sizing());
    let width_value = style.get("width").unwrap_or(&ComputedValue::Auto);

    let (width, margin, outer_width) = if width_value.is_auto() {
        let margin = EdgeSizes::from_sides(calc.resolve4(
            style.sides(MARGIN_KEYS),
            Some(0.0),
            Some(parent_width),
        )?);
        (given_outer_width, margin, true)
    } else {
        // width is resolvable, so `margin: auto` takes the remaining space
        let width = calc.resolve(width_value, None, Some(parent_width))?;
        let margin_values = style.sides(MARGIN_KEYS);
        let (margin_top, margin_bottom) =
            calc.resolve2((margin_values[0], margin_values[2]), Some(0.0), Some(parent_width))?;
        let available =
            given_outer_width - (width + border.horizontal() + padding.horizontal());
        let (margin_right, margin_left) = match (margin_values[1], margin_values[3]) {
            (ComputedValue::Auto, ComputedValue::Auto) => (available / 2.0, available / 2.0),
            (ComputedValue::Auto, left) => {
                let left = calc.resolve(left, None, Some(parent_width))?;
                (available - left, left)
            }
            (right, ComputedValue::Auto) => {
                let right = calc.resolve(right, None, Some(parent_width))?;
                (right, available - right)
            }
            (right, left) => (
                calc.resolve(right, None, Some(parent_width))?,
                calc.resolve(left, None, Some(parent_width))?,
            ),
        };
        let margin = EdgeSizes {
            top: margin_top,
            right: margin_right,
            bottom: margin_bottom,
            left: margin_left,
        };
        (width, margin, false)
    };

    let height_value = style.get("height").unwrap_or(&ComputedValue::Auto);
    let height = calc.resolve(height_value, Some(UNRESOLVED), Some(parent_height))?;

    let mut css_box = CssBox {
        sizing,
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height,
        margin,
        border,
        padding,
    };
    // an outer width shrinks into the sizing space; a declared width is
    // already in it
    if outer_width {
        let (h, _) = css_box.size_offsets(sizing, BoxType::Outer);
        css_box.width = (width - h).max(0.0);
    } else {
        css_box.width = width.max(0.0);
    }

    let height_auto = css_box.height_unresolved();
    Ok((css_box, height_auto))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(width: f32, padding: f32, border: f32, margin: f32) -> CssBox {
        CssBox {
            sizing: BoxType::Content,
            x: 10.0,
            y: 20.0,
            width,
            height: 50.0,
            margin: EdgeSizes::from_sides([margin; 4]),
            border: EdgeSizes::from_sides([border; 4]),
            padding: EdgeSizes::from_sides([padding; 4]),
        }
    }

    #[test]
    fn width_conversions_roundtrip() {
        let b = boxed(100.0, 10.0, 3.0, 20.0);
        assert_eq!(b.width_of(BoxType::Border), 100.0 + 2.0 * 10.0 + 2.0 * 3.0);
        assert_eq!(
            b.width_of(BoxType::Outer),
            100.0 + 2.0 * 10.0 + 2.0 * 3.0 + 2.0 * 20.0
        );
        // converting out and back is the identity
        let mut border_sized = b;
        border_sized.sizing = BoxType::Border;
        border_sized.width = b.width_of(BoxType::Border);
        assert_eq!(border_sized.width_of(BoxType::Content), b.width);
    }

    #[test]
    fn positions_shift_by_edges() {
        let b = boxed(100.0, 10.0, 3.0, 20.0);
        let outer = b.rect_of(BoxType::Outer);
        assert_eq!(outer.x, 10.0 - 10.0 - 3.0 - 20.0);
        let border = b.rect_of(BoxType::Border);
        assert_eq!(border.x, 10.0 - 13.0);
        assert_eq!(border.y, 20.0 - 13.0);
    }

    #[test]
    fn set_position_outer() {
        let mut b = boxed(100.0, 10.0, 3.0, 20.0);
        b.set_position(BoxType::Outer, 0.0, 0.0);
        assert_eq!(b.rect_of(BoxType::Outer).x, 0.0);
        assert_eq!(b.x, 33.0);
    }
}
