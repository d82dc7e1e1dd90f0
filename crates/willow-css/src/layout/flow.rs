//! Flow layout: strategy selection, block stacking, inline line breaking,
//! absolute positioning, and hit testing.
//!
//! [§ 9.4 Normal flow](https://www.w3.org/TR/CSS2/visuren.html#normal-flow)
//!
//! There are two layout modes in flow layout. An element either lays its
//! children out as blocks (all children block-level), or inline. When the
//! source mixes both, consecutive inline children are grouped into
//! anonymous block boxes.
//!
//! Margin collapsing between in-flow siblings subtracts
//! `min(prev_bottom, next_top)` from the flow cursor, so the border-edge
//! gap ends up at `max` of the two (margins are non-negative here). Empty
//! boxes collapse their own top and bottom margins; the parent's edges
//! collapse with its first/last child when no border or padding
//! intervenes.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use willow_dom::{DomTree, NodeId, NodeType};

use crate::error::BugError;
use crate::layout::box_model::{BoxType, CssBox, Rect, make_box};
use crate::layout::inline::{
    FontMetrics, FontQuery, InlineContent, InlineItem, InlineLayout, resolved_line_height,
    resolved_word_spacing,
};
use crate::layout::text_align;
use crate::style::{ComputedStyle, DisplayKind, INSET_KEYS};
use crate::values::{Calculator, ComputedValue};

/// Everything layout reads.
pub struct LayoutInput<'a> {
    /// The element tree.
    pub tree: &'a DomTree,
    /// Per-element computed styles.
    pub styles: &'a HashMap<NodeId, Arc<ComputedStyle>>,
    /// The host's font measurements.
    pub metrics: &'a dyn FontMetrics,
    /// Viewport size in px.
    pub viewport: (f32, f32),
}

/// How an element laid out its children.
#[derive(Debug, Clone, Default, Serialize)]
pub enum LayoutKind {
    /// Nothing below (no children, `display: none`, or an atomic box).
    #[default]
    Empty,
    /// Block flow: children stacked vertically.
    Block(Vec<BlockItem>),
    /// Inline flow: flattened items on line boxes.
    Inline(InlineLayout),
}

/// One vertically stacked unit of a block layout.
#[derive(Debug, Clone, Serialize)]
pub enum BlockItem {
    /// A real block-level child element.
    Element(NodeId),
    /// Consecutive inline content wrapped in an anonymous block.
    Anonymous(AnonymousBlock),
}

/// [§ 9.2.1.1 Anonymous block boxes](https://www.w3.org/TR/CSS2/visuren.html#anonymous-block-level)
///
/// Groups a run of inline children of a block container.
#[derive(Debug, Clone, Serialize)]
pub struct AnonymousBlock {
    /// Content rectangle (local until positioning, then absolute).
    pub rect: Rect,
    /// The inline layout inside.
    pub inline: InlineLayout,
}

/// One element's layout result.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ElementLayout {
    /// The element's box geometry (absolute after positioning).
    pub css_box: CssBox,
    /// How the children were laid out.
    pub kind: LayoutKind,
    /// Height of the laid-out content (for overflow/scroll handling).
    pub content_height: f32,
}

/// The laid-out box tree, keyed by element.
#[derive(Debug, Default, Serialize)]
pub struct LayoutTree {
    /// Per-element geometry and child layout.
    pub boxes: HashMap<NodeId, ElementLayout>,
    /// Effective display per element (inline children of a block-holding
    /// parent are promoted to block here).
    pub displays: HashMap<NodeId, DisplayKind>,
}

impl LayoutTree {
    /// An element's layout, if it was rendered.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&ElementLayout> {
        self.boxes.get(&id)
    }
}

/// Elements that participate in inline layout as single opaque boxes
/// instead of flattening their content.
fn is_atomic_inline(tag: &str) -> bool {
    matches!(tag, "br" | "img" | "input")
}

/// Lay out the whole document for a viewport.
///
/// The root element's box is pinned to the viewport; everything below
/// follows from the computed styles. Positions come out absolute (the
/// final positioning pass folds in each ancestor's content origin and
/// scroll offset).
///
/// # Errors
///
/// Returns [`BugError`] on internal invariant violations (a missing
/// style, an impossible value reaching the box model); malformed input
/// never errors here.
pub fn layout_document(input: &LayoutInput) -> Result<LayoutTree, BugError> {
    let root = input
        .tree
        .document_element()
        .ok_or_else(|| BugError::new("document has no root element"))?;

    let mut lt = LayoutTree::default();
    let _ = compute_displays(input, &mut lt.displays, root);
    // the root is always a block
    let _ = lt.displays.insert(root, DisplayKind::Block);

    let (width, height) = input.viewport;
    let root_layout = ElementLayout {
        css_box: CssBox {
            width,
            height,
            ..CssBox::empty()
        },
        kind: LayoutKind::Empty,
        content_height: 0.0,
    };
    let _ = lt.boxes.insert(root, root_layout);
    layout_children(input, &mut lt, root, false, height)?;
    position_element(input, &mut lt, root, (0.0, 0.0));
    Ok(lt)
}

/// Bottom-up effective display: `none` prunes; any block child promotes
/// the parent to block (false inline elements adjust to block layout).
fn compute_displays(
    input: &LayoutInput,
    displays: &mut HashMap<NodeId, DisplayKind>,
    id: NodeId,
) -> DisplayKind {
    let declared = input
        .styles
        .get(&id)
        .map_or(DisplayKind::Inline, |s| s.display());
    let mut effective = declared;
    if declared != DisplayKind::None {
        for &child in input.tree.children(id) {
            if input.tree.as_element(child).is_some()
                && compute_displays(input, displays, child) == DisplayKind::Block
            {
                effective = DisplayKind::Block;
            }
        }
    }
    let _ = displays.insert(id, effective);
    effective
}

fn style_of<'a>(input: &'a LayoutInput, id: NodeId) -> Result<&'a Arc<ComputedStyle>, BugError> {
    input
        .styles
        .get(&id)
        .ok_or_else(|| BugError::new(format!("element {id:?} has no computed style")))
}

/// Lay out one element into the given available width.
///
/// `parent_height` is the nearest resolved ancestor content height
/// (percentage heights and bottom-anchored insets resolve against it).
fn layout_element(
    input: &LayoutInput,
    lt: &mut LayoutTree,
    id: NodeId,
    available_width: f32,
    parent_height: f32,
) -> Result<(), BugError> {
    if lt.displays.get(&id) == Some(&DisplayKind::None) {
        let _ = lt.boxes.insert(id, ElementLayout::default());
        return Ok(());
    }
    let style = style_of(input, id)?.clone();
    let (css_box, height_auto) = make_box(available_width, &style, available_width, parent_height)?;
    let _ = lt.boxes.insert(
        id,
        ElementLayout {
            css_box,
            kind: LayoutKind::Empty,
            content_height: 0.0,
        },
    );
    layout_children(input, lt, id, height_auto, parent_height)
}

/// Pick and run the layout strategy for an element's children.
fn layout_children(
    input: &LayoutInput,
    lt: &mut LayoutTree,
    id: NodeId,
    height_auto: bool,
    parent_height: f32,
) -> Result<(), BugError> {
    let children = displayed_children(input, lt, id);
    let has_block = children.iter().any(|&c| {
        input.tree.as_element(c).is_some() && lt.displays.get(&c) == Some(&DisplayKind::Block)
    });
    let has_content = children.iter().any(|&c| match &input.tree.get(c).map(|n| &n.node_type) {
        Some(NodeType::Text(t)) => !t.trim().is_empty(),
        Some(NodeType::Element(_)) => true,
        _ => false,
    });

    if !has_content || is_atomic_inline(element_tag(input, id)) {
        if height_auto {
            if let Some(entry) = lt.boxes.get_mut(&id) {
                entry.css_box.set_content_height(0.0);
            }
        }
        return Ok(());
    }
    if has_block {
        layout_block(input, lt, id, &children, height_auto, parent_height)
    } else {
        layout_inline_container(input, lt, id, height_auto, parent_height)
    }
}

fn element_tag<'a>(input: &'a LayoutInput, id: NodeId) -> &'a str {
    input
        .tree
        .as_element(id)
        .map_or("", |data| data.tag_name.as_str())
}

/// Children that take part in layout (everything but `display: none`
/// subtrees and comments).
fn displayed_children(input: &LayoutInput, lt: &LayoutTree, id: NodeId) -> Vec<NodeId> {
    input
        .tree
        .children(id)
        .iter()
        .copied()
        .filter(|&c| match &input.tree.get(c).map(|n| &n.node_type) {
            Some(NodeType::Text(_)) => true,
            Some(NodeType::Element(_)) => lt.displays.get(&c) != Some(&DisplayKind::None),
            _ => false,
        })
        .collect()
}

/// Sibling margin collapsing: the amount the flow cursor backs up between
/// two adjacent margins. No floats, no clear, no negative margins.
fn margin_collapsing(last: f32, current: f32) -> f32 {
    last.min(current)
}

/// [§ 9.4.1 Block formatting contexts](https://www.w3.org/TR/CSS2/visuren.html#block-formatting)
///
/// Stack the children vertically at x = 0, collapsing adjacent vertical
/// margins; then place out-of-flow children from their insets.
fn layout_block(
    input: &LayoutInput,
    lt: &mut LayoutTree,
    id: NodeId,
    children: &[NodeId],
    height_auto: bool,
    parent_height: f32,
) -> Result<(), BugError> {
    let own_box = lt.boxes.get(&id).map(|e| e.css_box).unwrap_or_default();
    let content_width = own_box.width_of(BoxType::Content);
    let child_parent_height = if height_auto {
        parent_height
    } else {
        own_box.height_of(BoxType::Content)
    };

    // group children: block elements flow as themselves, consecutive
    // inline content wraps into anonymous blocks; out-of-flow elements
    // are placed after the flow
    let mut flow: Vec<FlowChild> = Vec::new();
    let mut out_of_flow: Vec<NodeId> = Vec::new();
    let mut inline_run: Vec<NodeId> = Vec::new();
    for &child in children {
        let is_block_element = input.tree.as_element(child).is_some()
            && lt.displays.get(&child) == Some(&DisplayKind::Block);
        if is_block_element {
            if !inline_run.is_empty() {
                flow.push(FlowChild::InlineRun(std::mem::take(&mut inline_run)));
            }
            let in_flow = style_of(input, child)?.position().in_flow();
            if in_flow {
                flow.push(FlowChild::Element(child));
            } else {
                out_of_flow.push(child);
            }
        } else {
            inline_run.push(child);
        }
    }
    if !inline_run.is_empty() {
        flow.push(FlowChild::InlineRun(inline_run));
    }

    let mut items: Vec<BlockItem> = Vec::new();
    let mut y_cursor: f32 = 0.0;
    let mut last_margin: f32 = 0.0;
    if !flow.is_empty() && own_box.padding.top == 0.0 && own_box.border.top == 0.0 {
        // the parent's top margin collapses into the first child's
        last_margin = own_box.margin.top;
    }
    for flow_child in flow {
        match flow_child {
            FlowChild::Element(child) => {
                layout_element(input, lt, child, content_width, child_parent_height)?;
                let Some(child_entry) = lt.boxes.get_mut(&child) else {
                    continue;
                };
                let margins = child_entry.css_box.margin;
                // empty boxes collapse their own top and bottom margins
                if child_entry.css_box.height_of(BoxType::Border) == 0.0 {
                    y_cursor -= margin_collapsing(margins.top, margins.bottom);
                }
                y_cursor -= margin_collapsing(last_margin, margins.top);
                last_margin = margins.bottom;
                child_entry.css_box.set_position(BoxType::Outer, 0.0, y_cursor);
                y_cursor += child_entry.css_box.height_of(BoxType::Outer);
                items.push(BlockItem::Element(child));
            }
            FlowChild::InlineRun(nodes) => {
                let container_style = style_of(input, id)?.clone();
                let pieces = flatten_inline_nodes(input, lt, &nodes);
                let inline = layout_inline_pieces(
                    input,
                    lt,
                    &pieces,
                    &container_style,
                    content_width,
                    child_parent_height,
                )?;
                if inline.items.is_empty() {
                    continue;
                }
                let rect = Rect {
                    x: 0.0,
                    y: y_cursor,
                    width: content_width,
                    height: inline.height,
                };
                y_cursor += inline.height;
                last_margin = 0.0;
                items.push(BlockItem::Anonymous(AnonymousBlock { rect, inline }));
            }
        }
    }

    if height_auto {
        if let Some(entry) = lt.boxes.get_mut(&id) {
            // the parent's bottom margin collapses with the last child's
            if entry.css_box.padding.bottom == 0.0 && entry.css_box.border.bottom == 0.0 {
                y_cursor -= margin_collapsing(last_margin, entry.css_box.margin.bottom);
            }
            entry.css_box.set_content_height(y_cursor);
        }
    }
    let own_content_height = lt
        .boxes
        .get(&id)
        .map_or(0.0, |e| e.css_box.height_of(BoxType::Content));

    // out-of-flow children position from their insets: x from left, else
    // right, else 0; y from top, else bottom, else 0
    for child in out_of_flow {
        layout_element(input, lt, child, content_width, own_content_height)?;
        let child_style = style_of(input, child)?.clone();
        let inset = resolve_inset(&child_style, content_width, own_content_height)?;
        let Some(child_entry) = lt.boxes.get_mut(&child) else {
            continue;
        };
        let outer_w = child_entry.css_box.width_of(BoxType::Outer);
        let outer_h = child_entry.css_box.height_of(BoxType::Outer);
        let x = inset
            .left
            .or(inset.right.map(|r| content_width - r - outer_w))
            .unwrap_or(0.0);
        let y = inset
            .top
            .or(inset.bottom.map(|b| own_content_height - b - outer_h))
            .unwrap_or(0.0);
        child_entry.css_box.set_position(BoxType::Outer, x, y);
        items.push(BlockItem::Element(child));
    }

    if let Some(entry) = lt.boxes.get_mut(&id) {
        entry.kind = LayoutKind::Block(items);
        entry.content_height = y_cursor;
    }
    Ok(())
}

enum FlowChild {
    Element(NodeId),
    InlineRun(Vec<NodeId>),
}

struct ResolvedInset {
    top: Option<f32>,
    right: Option<f32>,
    bottom: Option<f32>,
    left: Option<f32>,
}

/// Resolve the four inset properties; `auto` stays `None`. Vertical
/// insets resolve percentages against the height, horizontal against the
/// width.
fn resolve_inset(
    style: &ComputedStyle,
    width: f32,
    height: f32,
) -> Result<ResolvedInset, BugError> {
    let calc = Calculator::default();
    let sides = style.sides(INSET_KEYS);
    let resolve = |value: &ComputedValue, reference: f32| -> Result<Option<f32>, BugError> {
        if value.is_auto() {
            Ok(None)
        } else {
            calc.resolve(value, None, Some(reference)).map(Some)
        }
    };
    Ok(ResolvedInset {
        top: resolve(sides[0], height)?,
        right: resolve(sides[1], width)?,
        bottom: resolve(sides[2], height)?,
        left: resolve(sides[3], width)?,
    })
}

/// One not-yet-measured inline piece.
struct InlinePiece {
    content: InlineContent,
    whitespace: bool,
}

/// Lay an element's own content out as inline lines.
fn layout_inline_container(
    input: &LayoutInput,
    lt: &mut LayoutTree,
    id: NodeId,
    height_auto: bool,
    parent_height: f32,
) -> Result<(), BugError> {
    let container_style = style_of(input, id)?.clone();
    let content_width = lt
        .boxes
        .get(&id)
        .map_or(0.0, |e| e.css_box.width_of(BoxType::Content));
    let mut pieces = Vec::new();
    flatten_inline(input, lt, id, &mut pieces);
    let inline = layout_inline_pieces(
        input,
        lt,
        &pieces,
        &container_style,
        content_width,
        parent_height,
    )?;
    if let Some(entry) = lt.boxes.get_mut(&id) {
        if height_auto {
            entry.css_box.set_content_height(inline.height);
        }
        entry.content_height = inline.height;
        entry.kind = LayoutKind::Inline(inline);
    }
    Ok(())
}

fn flatten_inline_nodes(input: &LayoutInput, lt: &LayoutTree, nodes: &[NodeId]) -> Vec<InlinePiece> {
    let mut pieces = Vec::new();
    for &node in nodes {
        flatten_node(input, lt, node, &mut pieces);
    }
    pieces
}

/// Flatten an element's content into inline pieces (the leaves of the
/// layout tree): words with their owning element, and atomic elements.
fn flatten_inline(input: &LayoutInput, lt: &LayoutTree, id: NodeId, out: &mut Vec<InlinePiece>) {
    for &child in input.tree.children(id) {
        flatten_node(input, lt, child, out);
    }
}

fn flatten_node(input: &LayoutInput, lt: &LayoutTree, node: NodeId, out: &mut Vec<InlinePiece>) {
    match input.tree.get(node).map(|n| &n.node_type) {
        Some(NodeType::Text(text)) => {
            let owner = input.tree.parent(node).unwrap_or(node);
            let words: Vec<&str> = text.split_ascii_whitespace().collect();
            if words.is_empty() {
                // whitespace-only text still separates the neighbors
                if !text.is_empty() {
                    if let Some(last) = out.last_mut() {
                        last.whitespace = true;
                    }
                }
                return;
            }
            let trailing_whitespace = text.trim_end() != text.as_str();
            let last_index = words.len() - 1;
            for (i, word) in words.into_iter().enumerate() {
                out.push(InlinePiece {
                    content: InlineContent::Word {
                        text: word.to_string(),
                        owner,
                    },
                    whitespace: i != last_index || trailing_whitespace,
                });
            }
        }
        Some(NodeType::Element(data)) => {
            if lt.displays.get(&node) == Some(&DisplayKind::None) {
                return;
            }
            if is_atomic_inline(&data.tag_name) {
                out.push(InlinePiece {
                    content: InlineContent::Element(node),
                    whitespace: false,
                });
            } else {
                flatten_inline(input, lt, node, out);
            }
        }
        _ => {}
    }
}

/// Greedy left-to-right line breaking with per-line alignment.
///
/// An item's advance is its width plus word spacing when it carries
/// trailing whitespace; a line breaks when the next item would overflow;
/// each finished line is as tall as its tallest item and is aligned per
/// the container's `text-align`.
fn layout_inline_pieces(
    input: &LayoutInput,
    lt: &mut LayoutTree,
    pieces: &[InlinePiece],
    container_style: &ComputedStyle,
    width: f32,
    parent_height: f32,
) -> Result<InlineLayout, BugError> {
    let align = container_style.text_align();
    let mut items: Vec<InlineItem> = Vec::new();

    // measure every piece
    for piece in pieces {
        let rect = match &piece.content {
            InlineContent::Word { text, owner } => {
                let owner_style = style_of(input, *owner)?.clone();
                let query = FontQuery::from_style(&owner_style);
                let mut item_width = input.metrics.text_width(&query, text);
                if piece.whitespace {
                    item_width += resolved_word_spacing(&owner_style, input.metrics);
                }
                Rect {
                    x: 0.0,
                    y: 0.0,
                    width: item_width,
                    height: resolved_line_height(&owner_style, input.metrics),
                }
            }
            InlineContent::Element(el) => {
                layout_element(input, lt, *el, width, parent_height)?;
                let outer = lt
                    .boxes
                    .get(el)
                    .map_or_else(Rect::default, |e| e.css_box.rect_of(BoxType::Outer));
                Rect {
                    x: 0.0,
                    y: 0.0,
                    width: outer.width,
                    height: outer.height.max(0.0),
                }
            }
        };
        items.push(InlineItem {
            rect,
            abs_rect: Rect::default(),
            content: piece.content.clone(),
            whitespace: piece.whitespace,
        });
    }

    // break into lines
    let mut x = 0.0f32;
    let mut y = 0.0f32;
    let mut line_start = 0usize;
    let mut index = 0usize;
    while index < items.len() {
        let item_width = items[index].rect.width;
        if x + item_width > width && index > line_start {
            finish_line(lt, &mut items[line_start..index], align, width, &mut y);
            x = 0.0;
            line_start = index;
        }
        items[index].rect.x = x;
        x += item_width;
        index += 1;
    }
    if line_start < items.len() {
        finish_line(lt, &mut items[line_start..], align, width, &mut y);
    }

    Ok(InlineLayout { items, height: y })
}

/// Close the current line: compute its height, apply `text-align`, and
/// advance the y cursor.
fn finish_line(
    lt: &mut LayoutTree,
    line: &mut [InlineItem],
    align: crate::style::TextAlign,
    width: f32,
    y: &mut f32,
) {
    if line.is_empty() {
        return;
    }
    let line_height = line
        .iter()
        .map(|item| item.rect.height)
        .fold(0.0f32, f32::max);
    let widths: Vec<f32> = line.iter().map(|item| item.rect.width).collect();
    let xs = text_align::align_offsets(align, width, &widths);
    for (item, x) in line.iter_mut().zip(xs) {
        item.rect.x = x;
        item.rect.y = *y;
        // atomic elements track their line slot
        if let InlineContent::Element(el) = &item.content {
            if let Some(entry) = lt.boxes.get_mut(el) {
                entry.css_box.set_position(BoxType::Outer, x, *y);
            }
        }
    }
    *y += line_height;
}

/// The positioning pass: fold each ancestor's content origin (minus its
/// scroll offset) into the stored relative positions, making everything
/// absolute in viewport coordinates.
fn position_element(input: &LayoutInput, lt: &mut LayoutTree, id: NodeId, origin: (f32, f32)) {
    let Some(mut entry) = lt.boxes.remove(&id) else {
        return;
    };
    entry.css_box.translate(origin.0, origin.1);
    let content = entry.css_box.rect_of(BoxType::Content);
    let scroll = input
        .tree
        .as_element(id)
        .map_or(0.0, |data| data.scroll_y);
    let child_origin = (content.x, content.y - scroll);
    // take the kind while recursing into children
    let mut kind = std::mem::take(&mut entry.kind);
    let _ = lt.boxes.insert(id, entry);

    match &mut kind {
        LayoutKind::Empty => {}
        LayoutKind::Block(items) => {
            for item in items.iter_mut() {
                match item {
                    BlockItem::Element(child) => {
                        position_element(input, lt, *child, child_origin);
                    }
                    BlockItem::Anonymous(anon) => {
                        anon.rect = anon.rect.translated(child_origin.0, child_origin.1);
                        position_inline(input, lt, &mut anon.inline, (anon.rect.x, anon.rect.y));
                    }
                }
            }
        }
        LayoutKind::Inline(inline) => {
            position_inline(input, lt, inline, child_origin);
        }
    }
    if let Some(entry) = lt.boxes.get_mut(&id) {
        entry.kind = kind;
    }
}

fn position_inline(
    input: &LayoutInput,
    lt: &mut LayoutTree,
    inline: &mut InlineLayout,
    origin: (f32, f32),
) {
    for item in &mut inline.items {
        item.abs_rect = item.rect.translated(origin.0, origin.1);
        if let InlineContent::Element(el) = &item.content {
            // the element's outer box already sits at the item's slot;
            // positioning folds in the same origin
            position_element(input, lt, *el, origin);
        }
    }
}

/// Depth-first, children-first hit test: the innermost element whose
/// border box contains the point. Inline layouts hit-test each item's
/// absolute rectangle.
#[must_use]
pub fn hit_test(tree: &DomTree, lt: &LayoutTree, id: NodeId, x: f32, y: f32) -> Option<NodeId> {
    let entry = lt.get(id)?;
    match &entry.kind {
        LayoutKind::Empty => {}
        LayoutKind::Block(items) => {
            for item in items.iter().rev() {
                let hit = match item {
                    BlockItem::Element(child) => hit_test(tree, lt, *child, x, y),
                    BlockItem::Anonymous(anon) => hit_test_inline(tree, lt, &anon.inline, x, y),
                };
                if hit.is_some() {
                    return hit;
                }
            }
        }
        LayoutKind::Inline(inline) => {
            if let Some(hit) = hit_test_inline(tree, lt, inline, x, y) {
                return Some(hit);
            }
        }
    }
    entry
        .css_box
        .rect_of(BoxType::Border)
        .contains(x, y)
        .then_some(id)
}

fn hit_test_inline(
    tree: &DomTree,
    lt: &LayoutTree,
    inline: &InlineLayout,
    x: f32,
    y: f32,
) -> Option<NodeId> {
    for item in &inline.items {
        if !item.abs_rect.contains(x, y) {
            continue;
        }
        match &item.content {
            InlineContent::Word { owner, .. } => return Some(*owner),
            InlineContent::Element(el) => {
                return hit_test(tree, lt, *el, x, y).or(Some(*el));
            }
        }
    }
    None
}
