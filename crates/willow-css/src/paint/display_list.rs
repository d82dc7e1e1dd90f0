//! Display list: a sequence of drawing commands in painting order.
//!
//! [CSS 2.1 Appendix E.2 Painting order](https://www.w3.org/TR/CSS2/zindex.html#painting-order)
//!
//! Per element: background fill (with border radii), background image
//! layers, the border, the content (text runs, atomic boxes, children),
//! and finally the outline. Commands are back-to-front; a renderer just
//! iterates and executes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use willow_dom::{DomTree, NodeId};

use crate::layout::box_model::{BoxType, EdgeSizes, Rect};
use crate::layout::flow::{BlockItem, LayoutKind, LayoutTree};
use crate::layout::inline::{FontQuery, InlineContent, InlineLayout};
use crate::style::{BORDER_COLOR_KEYS, BORDER_RADIUS_KEYS, ComputedStyle};
use crate::values::{Calculator, Color, ComputedValue, FontStyleKind, ImageSource};

/// Corner radii in `x/y` pairs, top-left clockwise.
pub type CornerRadii = [(f32, f32); 4];

/// A single drawing command.
#[derive(Debug, Clone, Serialize)]
pub enum DisplayCommand {
    /// Fill a (possibly rounded) rectangle with a solid color.
    FillRect {
        /// The rectangle to fill.
        rect: Rect,
        /// Fill color.
        color: Color,
        /// Corner radii (all zero for a plain rectangle).
        radii: CornerRadii,
    },
    /// Blit an image layer into a rectangle; a failed load is a no-op.
    Image {
        /// The destination rectangle.
        rect: Rect,
        /// Where the host fetches the pixels from.
        src: String,
    },
    /// Stroke a border inside the given border-box rectangle.
    Border {
        /// The border box.
        rect: Rect,
        /// Per-side widths.
        widths: EdgeSizes,
        /// Per-side colors, in top/right/bottom/left order.
        colors: [Color; 4],
        /// Corner radii.
        radii: CornerRadii,
    },
    /// Stroke an outline around the border box.
    Outline {
        /// The border box the outline surrounds.
        rect: Rect,
        /// Outline width.
        width: f32,
        /// Outline color.
        color: Color,
        /// Gap between the border box and the outline.
        offset: f32,
    },
    /// Draw a run of text.
    Text {
        /// X of the run's top-left corner.
        x: f32,
        /// Y of the run's top-left corner.
        y: f32,
        /// The text.
        text: String,
        /// Font families in preference order.
        families: Vec<String>,
        /// Font size in px.
        size: f32,
        /// Numeric font weight.
        weight: f32,
        /// Whether the face is italic/oblique.
        italic: bool,
        /// Text color.
        color: Color,
    },
}

/// A list of drawing commands in painting order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DisplayList {
    commands: Vec<DisplayCommand>,
}

impl DisplayList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a command.
    pub fn push(&mut self, command: DisplayCommand) {
        self.commands.push(command);
    }

    /// The commands in painting order.
    #[must_use]
    pub fn commands(&self) -> &[DisplayCommand] {
        &self.commands
    }

    /// Number of commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Paint the whole document into a display list.
#[must_use]
pub fn build_display_list(
    tree: &DomTree,
    styles: &HashMap<NodeId, Arc<ComputedStyle>>,
    lt: &LayoutTree,
) -> DisplayList {
    let mut list = DisplayList::new();
    if let Some(root) = tree.document_element() {
        paint_element(tree, styles, lt, root, &mut list);
    }
    list
}

fn paint_element(
    tree: &DomTree,
    styles: &HashMap<NodeId, Arc<ComputedStyle>>,
    lt: &LayoutTree,
    id: NodeId,
    list: &mut DisplayList,
) {
    let Some(entry) = lt.get(id) else { return };
    let Some(style) = styles.get(&id) else { return };
    let border_rect = entry.css_box.rect_of(BoxType::Border);
    let radii = corner_radii(style, border_rect);

    // 1. background color
    if let Some(ComputedValue::Color(bg)) = style.get("background-color") {
        if bg.a > 0 {
            list.push(DisplayCommand::FillRect {
                rect: border_rect,
                color: *bg,
                radii,
            });
        }
    }
    // 2. background image layers
    if let Some(ComputedValue::Images(layers)) = style.get("background-image") {
        for ImageSource::Url(src) in layers {
            list.push(DisplayCommand::Image {
                rect: border_rect,
                src: src.clone(),
            });
        }
    }
    // 3. border
    let widths = entry.css_box.border;
    if widths.top > 0.0 || widths.right > 0.0 || widths.bottom > 0.0 || widths.left > 0.0 {
        let colors = BORDER_COLOR_KEYS.map(|key| {
            style
                .get(key)
                .and_then(ComputedValue::as_color)
                .unwrap_or(Color::BLACK)
        });
        list.push(DisplayCommand::Border {
            rect: border_rect,
            widths,
            colors,
            radii,
        });
    }
    // 4. content
    match &entry.kind {
        LayoutKind::Empty => {}
        LayoutKind::Block(items) => {
            for item in items {
                match item {
                    BlockItem::Element(child) => paint_element(tree, styles, lt, *child, list),
                    BlockItem::Anonymous(anon) => {
                        paint_inline(tree, styles, lt, &anon.inline, list);
                    }
                }
            }
        }
        LayoutKind::Inline(inline) => paint_inline(tree, styles, lt, inline, list),
    }
    // 5. outline
    if let Some(ComputedValue::Length(width)) = style.get("outline-width") {
        if *width > 0.0 {
            let color = style
                .get("outline-color")
                .and_then(ComputedValue::as_color)
                .unwrap_or(Color::BLACK);
            let offset = match style.get("outline-offset") {
                Some(ComputedValue::Length(o)) => *o,
                _ => 0.0,
            };
            list.push(DisplayCommand::Outline {
                rect: border_rect,
                width: *width,
                color,
                offset,
            });
        }
    }
}

fn paint_inline(
    tree: &DomTree,
    styles: &HashMap<NodeId, Arc<ComputedStyle>>,
    lt: &LayoutTree,
    inline: &InlineLayout,
    list: &mut DisplayList,
) {
    for item in &inline.items {
        match &item.content {
            InlineContent::Word { text, owner } => {
                let Some(owner_style) = styles.get(owner) else {
                    continue;
                };
                let query = FontQuery::from_style(owner_style);
                list.push(DisplayCommand::Text {
                    x: item.abs_rect.x,
                    y: item.abs_rect.y,
                    text: text.clone(),
                    families: query.families.to_vec(),
                    size: query.size,
                    weight: query.weight,
                    italic: query.style != FontStyleKind::Normal,
                    color: owner_style.color(),
                });
            }
            InlineContent::Element(el) => paint_element(tree, styles, lt, *el, list),
        }
    }
}

/// Resolve the four corner radii against the border box (x against its
/// width, y against its height).
fn corner_radii(style: &ComputedStyle, border_rect: Rect) -> CornerRadii {
    let calc = Calculator::default();
    BORDER_RADIUS_KEYS.map(|key| match style.get(key) {
        Some(ComputedValue::Pair(pair)) => {
            let rx = calc
                .resolve(&pair.0, Some(0.0), Some(border_rect.width))
                .unwrap_or(0.0);
            let ry = calc
                .resolve(&pair.1, Some(0.0), Some(border_rect.height))
                .unwrap_or(0.0);
            (rx.max(0.0), ry.max(0.0))
        }
        Some(ComputedValue::Length(r)) => (r.max(0.0), r.max(0.0)),
        _ => (0.0, 0.0),
    })
}
