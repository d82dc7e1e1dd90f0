//! Box model and flow layout.
//!
//! [CSS Display Level 3](https://www.w3.org/TR/css-display-3/)
//!
//! Geometry lives in [`box_model`]; [`flow`] walks the element tree and
//! produces a [`flow::LayoutTree`] of absolute boxes; [`inline`] holds the
//! font abstraction and inline item model; [`text_align`] positions
//! finished lines.

pub mod box_model;
pub mod flow;
pub mod inline;
pub mod text_align;

pub use box_model::{BoxType, CssBox, EdgeSizes, Rect, UNRESOLVED, make_box};
pub use flow::{
    AnonymousBlock, BlockItem, ElementLayout, LayoutInput, LayoutKind, LayoutTree, hit_test,
    layout_document,
};
pub use inline::{
    ApproximateFontMetrics, FontMetrics, FontQuery, InlineContent, InlineItem, InlineLayout,
};
