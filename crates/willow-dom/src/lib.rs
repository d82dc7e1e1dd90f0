//! DOM tree implementation for the Willow rendering engine.
//!
//! This crate provides an arena-based element tree loosely following the
//! [DOM Living Standard](https://dom.spec.whatwg.org/), extended with the
//! state bits and dirty flags the style/layout pipeline needs.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all
//! relationships, providing O(1) access and traversal without reference
//! cycles: children are owned by the arena, parents are plain back-indices.
//!
//! Styles and boxes are *not* stored here. The cascade and layout keep them
//! in side tables keyed by [`NodeId`], so this crate stays dependency-light
//! and the pipeline stays a pure function of the tree.

pub mod state;

use indexmap::IndexMap;

pub use state::StateFlags;

/// Map of attribute names to values for an element.
///
/// [§ 4.9.2 Interface `NamedNodeMap`](https://dom.spec.whatwg.org/#interface-namednodemap)
///
/// Insertion order is preserved for iteration and attribute names are stored
/// lowercased, making lookups case-insensitive the way HTML attributes are.
pub type AttributesMap = IndexMap<String, String>;

/// A type-safe index into the DOM tree.
///
/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing
/// issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Node is an abstract interface that is used by all nodes in a tree."
///
/// This node stores indices for parent/child/sibling relationships, enabling
/// O(1) traversal in any direction, plus the dirty flags that drive
/// incremental recomputation.
#[derive(Debug, Clone)]
pub struct Node {
    /// "Each node has an associated node type"
    pub node_type: NodeType,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-parent)
    /// "An object that participates in a tree has a parent, which is either
    /// null or an object."
    pub parent: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-child)
    /// "A node has an associated list of children"
    pub children: Vec<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-next-sibling)
    pub next_sibling: Option<NodeId>,

    /// [§ 4.4](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    pub prev_sibling: Option<NodeId>,

    /// Set when this node's computed style may no longer be valid
    /// (attribute change, state-bit change, sheet-set change).
    pub style_dirty: bool,

    /// Set when this node's box geometry may no longer be valid.
    pub layout_dirty: bool,
}

/// [§ 4.4 Interface Node](https://dom.spec.whatwg.org/#interface-node)
///
/// "Each node has an associated node type"
#[derive(Debug, Clone)]
pub enum NodeType {
    /// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#interface-document)
    Document,
    /// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
    Element(ElementData),
    /// [§ 4.10 Interface Text](https://dom.spec.whatwg.org/#interface-text)
    Text(String),
    /// [§ 4.7 Interface Comment](https://dom.spec.whatwg.org/#interface-comment)
    Comment(String),
}

/// Element-specific data.
///
/// [§ 4.9 Interface Element](https://dom.spec.whatwg.org/#interface-element)
///
/// Beyond the local name and attribute list this carries the dynamic state
/// bits consulted by state pseudo-class selectors, and the per-element
/// scroll offset maintained by the event plumbing.
#[derive(Debug, Clone)]
pub struct ElementData {
    /// "An element's local name"
    pub tag_name: String,
    /// "An element has an associated attribute list" (lowercased names,
    /// insertion order preserved)
    pub attrs: AttributesMap,
    /// Dynamic state bits (hover, focus, active, visited, checked, valid).
    pub state: StateFlags,
    /// Current vertical scroll offset, clamped by layout to the overflow.
    pub scroll_y: f32,
    /// Whether the last layout pass found content taller than the box.
    pub overflow: bool,
}

impl ElementData {
    /// Create element data for the given tag with lowercased attribute names.
    #[must_use]
    pub fn new(tag_name: impl Into<String>, attrs: impl IntoIterator<Item = (String, String)>) -> Self {
        let attrs = attrs
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        Self {
            tag_name: tag_name.into(),
            attrs,
            state: StateFlags::default(),
            scroll_y: 0.0,
            overflow: false,
        }
    }

    /// Get an attribute value (attribute names are case-insensitive).
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Get an attribute parsed as a number, if present and parseable.
    ///
    /// The typed accessor for numeric content attributes (`width`, `size`,
    /// `maxlength`, ...).
    #[must_use]
    pub fn attr_f32(&self, name: &str) -> Option<f32> {
        self.attr(name).and_then(|v| v.trim().parse().ok())
    }

    /// Whether a boolean content attribute is present (`disabled`,
    /// `required`, `checked`, ...).
    ///
    /// [§ 2.3.2 Boolean attributes](https://html.spec.whatwg.org/multipage/common-microsyntaxes.html#boolean-attributes)
    /// "The presence of a boolean attribute on an element represents the
    /// true value, and the absence of the attribute represents the false
    /// value."
    #[must_use]
    pub fn attr_bool(&self, name: &str) -> bool {
        self.attrs.contains_key(&name.to_ascii_lowercase())
    }

    /// Returns the element's id attribute value if present.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    /// Returns the whitespace-separated class names from the class attribute.
    ///
    /// [§ 3.2.6 Global attributes](https://html.spec.whatwg.org/multipage/dom.html#global-attributes)
    /// "The class attribute, if specified, must have a value that is a set of
    /// space-separated tokens."
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_ascii_whitespace()
    }

    /// Whether the element carries the given class.
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// Resolve a state pseudo-class name against this element.
    ///
    /// [HTML § Pseudo-classes](https://html.spec.whatwg.org/multipage/semantics-other.html#pseudo-classes)
    ///
    /// Some bits live in [`StateFlags`] (hover, focus, ...), some derive
    /// from content attributes (disabled, required), and some are the
    /// negation of another bit. Returns `None` for names outside the
    /// supported set so the selector layer can treat them as never-matching.
    #[must_use]
    pub fn state_bit(&self, name: &str) -> Option<bool> {
        let anchorish = self.tag_name.eq_ignore_ascii_case("a")
            || self.tag_name.eq_ignore_ascii_case("area");
        match name {
            "hover" => Some(self.state.hover),
            "focus" => Some(self.state.focus),
            "active" => Some(self.state.active),
            "checked" => Some(self.state.checked),
            "valid" => Some(self.state.valid),
            "invalid" => Some(!self.state.valid),
            "visited" => Some(anchorish && self.state.visited),
            "link" => Some(anchorish && self.attr_bool("href") && !self.state.visited),
            "any-link" => Some(anchorish && self.attr_bool("href")),
            "disabled" => Some(self.attr_bool("disabled")),
            "enabled" => Some(!self.attr_bool("disabled")),
            "required" => Some(self.attr_bool("required")),
            "optional" => Some(!self.attr_bool("required")),
            "blank" => Some(self.attr("value").is_none_or(str::is_empty)),
            _ => None,
        }
    }
}

/// A host-parsed document tree, the shape the external HTML parser hands us.
///
/// The engine never parses HTML itself; it consumes a callback of the form
/// `parse_html(text) → tree of (tag, attrs, text, children)` and converts
/// the result into the arena with [`DomTree::from_parsed`].
#[derive(Debug, Clone)]
pub enum ParsedNode {
    /// An element with its tag, attribute pairs, and child list.
    Element {
        /// The element's tag name.
        tag: String,
        /// Attribute name/value pairs in source order.
        attrs: Vec<(String, String)>,
        /// Child nodes in source order.
        children: Vec<ParsedNode>,
    },
    /// A run of raw text.
    Text(String),
}

/// Arena-based DOM tree with O(1) node access and traversal.
///
/// [§ 4 Nodes](https://dom.spec.whatwg.org/#nodes)
///
/// All nodes live in a contiguous vector, with indices for all
/// relationships. The Document node is always at index 0 ([`NodeId::ROOT`]).
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    nodes: Vec<Node>,
    /// Latched when any node's style is dirtied; cleared by the engine
    /// after a recompute pass.
    style_dirty: bool,
    /// Latched when any node's layout is dirtied; cleared after layout.
    layout_dirty: bool,
}

impl DomTree {
    /// Create a new DOM tree with just the Document node at the root.
    #[must_use]
    pub fn new() -> Self {
        let document = Node {
            node_type: NodeType::Document,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            style_dirty: true,
            layout_dirty: true,
        };
        Self {
            nodes: vec![document],
            style_dirty: true,
            layout_dirty: true,
        }
    }

    /// Build a tree from a host-parsed document.
    ///
    /// The parsed root element becomes the document element; a `Text` root
    /// produces a document with a single text child.
    #[must_use]
    pub fn from_parsed(parsed: &ParsedNode) -> Self {
        let mut tree = Self::new();
        let root = tree.insert_parsed(parsed);
        tree.append_child(NodeId::ROOT, root);
        tree
    }

    fn insert_parsed(&mut self, parsed: &ParsedNode) -> NodeId {
        match parsed {
            ParsedNode::Text(text) => self.alloc(NodeType::Text(text.clone())),
            ParsedNode::Element { tag, attrs, children } => {
                let id = self.alloc(NodeType::Element(ElementData::new(
                    tag.clone(),
                    attrs.iter().cloned(),
                )));
                for child in children {
                    let child_id = self.insert_parsed(child);
                    self.append_child(id, child_id);
                }
                id
            }
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (should always have at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node in the arena and return its ID.
    ///
    /// The node is not yet attached to the tree (no parent, no siblings).
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
            style_dirty: true,
            layout_dirty: true,
        });
        self.style_dirty = true;
        self.layout_dirty = true;
        id
    }

    /// [§ 4.2.2 Append](https://dom.spec.whatwg.org/#concept-node-append)
    ///
    /// "To append a node to a parent, pre-insert node into parent before
    /// null." Updates parent/child/sibling relationships for the common
    /// append-at-end case.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let prev_last_child = self.nodes[parent.0].children.last().copied();
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
        self.mark_layout_dirty(parent);
    }

    /// [§ 4.2.1 Remove](https://dom.spec.whatwg.org/#concept-node-remove)
    ///
    /// Detach `child` from `parent`, fixing up sibling links. The node stays
    /// allocated in the arena but is no longer reachable from the root.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) {
        let prev = self.nodes[child.0].prev_sibling;
        let next = self.nodes[child.0].next_sibling;
        if let Some(prev_id) = prev {
            self.nodes[prev_id.0].next_sibling = next;
        }
        if let Some(next_id) = next {
            self.nodes[next_id.0].prev_sibling = prev;
        }
        self.nodes[parent.0].children.retain(|&c| c != child);
        self.nodes[child.0].parent = None;
        self.nodes[child.0].prev_sibling = None;
        self.nodes[child.0].next_sibling = None;
        self.mark_layout_dirty(parent);
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// [§ 4.2.5 Ancestor](https://dom.spec.whatwg.org/#concept-tree-ancestor)
    ///
    /// Returns an iterator over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Returns an iterator over preceding siblings, nearest first.
    ///
    /// [§ 4.2.5 Previous sibling](https://dom.spec.whatwg.org/#concept-tree-previous-sibling)
    #[must_use]
    pub fn preceding_siblings(&self, id: NodeId) -> PrecedingSiblingIterator<'_> {
        PrecedingSiblingIterator {
            tree: self,
            current: self.prev_sibling(id),
        }
    }

    /// All element siblings sharing this node's parent, in tree order,
    /// including the node itself. Used by the sibling combinators.
    #[must_use]
    pub fn element_siblings(&self, id: NodeId) -> Vec<NodeId> {
        self.parent(id).map_or_else(Vec::new, |parent| {
            self.children(parent)
                .iter()
                .copied()
                .filter(|&c| self.as_element(c).is_some())
                .collect()
        })
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get mutable element data if this node is an element.
    pub fn as_element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        self.get_mut(id).and_then(|n| match &mut n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of all text descendants, in tree order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for desc in self.descendants(id) {
            if let Some(text) = self.as_text(desc) {
                out.push_str(text);
            }
        }
        out
    }

    /// [§ 4.2.6 Descendant](https://dom.spec.whatwg.org/#concept-tree-descendant)
    ///
    /// Returns an iterator over all descendants of a node in document order
    /// (depth-first, pre-order). Does not include the starting node.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        DescendantIterator {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Iterate over all nodes in the tree in document order.
    pub fn iter_all(&self) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::once(self.root()).chain(self.descendants(self.root()))
    }

    /// [§ 3.1.1 The document element](https://html.spec.whatwg.org/multipage/dom.html#the-html-element-2)
    ///
    /// "The document element of a document is the element whose parent is
    /// that document, if it exists; otherwise null." For HTML documents,
    /// this is the `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    // ── Mutators (each sets the appropriate dirty bits) ─────────────────

    /// Set a content attribute, dirtying the element's style.
    ///
    /// Attribute names are lowercased. Setting `style` also invalidates the
    /// element's cached inline declarations at the cascade layer (those are
    /// re-derived from this attribute).
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let lower = name.to_ascii_lowercase();
        if let Some(data) = self.as_element_mut(id) {
            let _ = data.attrs.insert(lower, value.to_string());
            self.mark_style_dirty(id);
        }
    }

    /// Remove a content attribute, dirtying the element's style.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        let lower = name.to_ascii_lowercase();
        if let Some(data) = self.as_element_mut(id) {
            if data.attrs.shift_remove(&lower).is_some() {
                self.mark_style_dirty(id);
            }
        }
    }

    /// Flip a dynamic state bit, dirtying style only on actual change.
    ///
    /// State bits settable here are the runtime ones (hover, focus, active,
    /// visited, checked, valid); attribute-derived bits are changed through
    /// [`DomTree::set_attribute`].
    pub fn set_state(&mut self, id: NodeId, f: impl FnOnce(&mut StateFlags)) {
        if let Some(data) = self.as_element_mut(id) {
            let before = data.state;
            f(&mut data.state);
            if data.state != before {
                self.mark_style_dirty(id);
            }
        }
    }

    /// Mark a node and its subtree style-dirty (computed style depends on
    /// the ancestor chain, so invalidation flows down), and dirty layout up
    /// the ancestor chain (geometry changes can resize ancestors).
    pub fn mark_style_dirty(&mut self, id: NodeId) {
        self.style_dirty = true;
        if let Some(node) = self.get_mut(id) {
            node.style_dirty = true;
        }
        let descendants: Vec<NodeId> = self.descendants(id).collect();
        for desc in descendants {
            if let Some(node) = self.get_mut(desc) {
                node.style_dirty = true;
            }
        }
        self.mark_layout_dirty(id);
    }

    /// Mark a node and its ancestor chain layout-dirty.
    pub fn mark_layout_dirty(&mut self, id: NodeId) {
        self.layout_dirty = true;
        let mut current = Some(id);
        while let Some(node_id) = current {
            if let Some(node) = self.get_mut(node_id) {
                node.layout_dirty = true;
                current = node.parent;
            } else {
                break;
            }
        }
    }

    /// Whether any node's style has been dirtied since the last
    /// [`DomTree::clear_style_dirty`].
    #[must_use]
    pub fn is_style_dirty(&self) -> bool {
        self.style_dirty
    }

    /// Whether any node's layout has been dirtied since the last
    /// [`DomTree::clear_layout_dirty`].
    #[must_use]
    pub fn is_layout_dirty(&self) -> bool {
        self.layout_dirty
    }

    /// Clear all style-dirty flags (called after a recompute pass).
    pub fn clear_style_dirty(&mut self) {
        self.style_dirty = false;
        for node in &mut self.nodes {
            node.style_dirty = false;
        }
    }

    /// Clear all layout-dirty flags (called after a layout pass).
    pub fn clear_layout_dirty(&mut self) {
        self.layout_dirty = false;
        for node in &mut self.nodes {
            node.layout_dirty = false;
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator that walks up the tree from a node to the root.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}

/// Iterator that walks backwards through siblings of a node.
pub struct PrecedingSiblingIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for PrecedingSiblingIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.prev_sibling(id);
        Some(id)
    }
}

/// Iterator that walks the tree in document order (depth-first, pre-order).
pub struct DescendantIterator<'a> {
    tree: &'a DomTree,
    /// Stack of nodes to visit (children are pushed in reverse order so we
    /// process them left-to-right).
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let children = self.tree.children(id);
        self.stack.extend(children.iter().rev().copied());
        Some(id)
    }
}
