//! The engine context.
//!
//! Everything the source system kept in its global `g` dictionary lives
//! here, passed explicitly: the document tree, the sheet set with its
//! generation counter, the viewport, the computed-style interner, the
//! visited-link set, and the event state. Only process-wide constants
//! (unit tables, named colors, the property registry) stay global.
//!
//! The frame loop contract: (1) drain input events, updating state bits;
//! (2) if style-dirty or the sheet set changed, re-cascade and recompute;
//! (3) if layout-dirty, re-lay out the root; (4) paint. All of it is
//! synchronous and non-blocking; I/O happened before the bytes got here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use willow_common::warning::{clear_warnings, warn_once};
use willow_css::layout::{BoxType, LayoutInput, LayoutTree};
use willow_css::style::defaults::UA_SHEET;
use willow_css::{
    BugError, ComputedStyle, ComputedValue, DisplayList, SourceSheet, StyleEnv, StyleInterner,
    build_display_list, cascaded_styles, compute_tree, extract_style_content, parse_sheet,
};
use willow_dom::{DomTree, NodeId, StateFlags};

use crate::events::{EventManager, InputEvent};
use crate::font_metrics::FontBook;

/// A running engine instance: one document, one viewport, one frame loop.
pub struct Engine {
    /// The element tree.
    pub tree: DomTree,
    /// Pointer/scroll state and event listeners.
    pub events: EventManager,
    /// Per-element computed styles (refreshed by [`Engine::frame`]).
    pub styles: HashMap<NodeId, Arc<ComputedStyle>>,
    /// The laid-out box tree (refreshed by [`Engine::frame`]).
    pub layout: LayoutTree,

    sheets: Vec<SourceSheet>,
    /// Bumped on every sheet-set change; a mismatch with
    /// `cascaded_generation` forces a re-cascade.
    sheet_generation: u64,
    cascaded_generation: u64,
    viewport: (f32, f32),
    default_font_size: f32,
    interner: StyleInterner,
    fonts: FontBook,
    visited: HashSet<String>,
    /// The location the current document was loaded from, for resolving
    /// relative stylesheet links.
    location: Option<String>,
}

impl Engine {
    /// A fresh engine for the given viewport.
    #[must_use]
    pub fn new(viewport: (f32, f32)) -> Self {
        Self {
            tree: DomTree::new(),
            events: EventManager::new(),
            styles: HashMap::new(),
            layout: LayoutTree::default(),
            sheets: vec![parse_sheet(UA_SHEET)],
            sheet_generation: 1,
            cascaded_generation: 0,
            viewport,
            default_font_size: willow_css::values::DEFAULT_FONT_SIZE,
            interner: StyleInterner::new(),
            fonts: FontBook::new(),
            visited: HashSet::new(),
            location: None,
        }
    }

    /// Replace the font provider.
    pub fn set_fonts(&mut self, fonts: FontBook) {
        self.fonts = fonts;
        self.tree.mark_layout_dirty(self.tree.root());
    }

    /// The current viewport.
    #[must_use]
    pub fn viewport(&self) -> (f32, f32) {
        self.viewport
    }

    /// Resize the viewport: media queries and every viewport-relative
    /// unit may change, so styles recompute.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        if self.viewport != (width, height) {
            self.viewport = (width, height);
            self.tree.mark_style_dirty(self.tree.root());
        }
    }

    /// Configure the `font-size: medium` reference.
    pub fn set_default_font_size(&mut self, px: f32) {
        self.default_font_size = px;
        self.tree.mark_style_dirty(self.tree.root());
    }

    /// Load a document, replacing the current one.
    ///
    /// Collects `<style>` contents and `<link rel="stylesheet">` targets
    /// as the document's sheets (below them sits the built-in user-agent
    /// sheet). `location` is used to resolve relative links.
    pub fn load_html(&mut self, html: &str, location: Option<&str>) {
        clear_warnings();
        self.tree = willow_html::parse_html(html);
        self.location = location.map(str::to_string);
        self.events = EventManager::new();
        self.styles.clear();
        self.layout = LayoutTree::default();

        self.sheets = vec![parse_sheet(UA_SHEET)];
        let inline_css = extract_style_content(&self.tree);
        if !inline_css.trim().is_empty() {
            self.sheets.push(parse_sheet(&inline_css));
        }
        for href in self.linked_sheet_urls() {
            match willow_common::net::fetch_text(&href) {
                Ok(css) => self.sheets.push(parse_sheet(&css)),
                Err(err) => warn_once("NET", &format!("stylesheet '{href}' failed to load: {err}")),
            }
        }
        self.sheet_generation += 1;
        self.apply_visited_bits();
        self.tree.mark_style_dirty(self.tree.root());
    }

    /// Add a sheet programmatically (e.g. a hot-reloaded file).
    pub fn add_sheet(&mut self, sheet: SourceSheet) {
        self.sheets.push(sheet);
        self.sheet_generation += 1;
    }

    fn linked_sheet_urls(&self) -> Vec<String> {
        let mut urls = Vec::new();
        for id in self.tree.iter_all() {
            let Some(data) = self.tree.as_element(id) else {
                continue;
            };
            if data.tag_name.eq_ignore_ascii_case("link")
                && data.attr("rel") == Some("stylesheet")
            {
                if let Some(href) = data.attr("href") {
                    urls.push(self.resolve_href(href));
                }
            }
        }
        urls
    }

    /// Resolve a relative href against the document location (path-join
    /// only; full URL semantics are the host's concern).
    fn resolve_href(&self, href: &str) -> String {
        if href.contains("://") || href.starts_with('/') || href.starts_with("data:") {
            return href.to_string();
        }
        match &self.location {
            Some(location) => match location.rfind('/') {
                Some(slash) => format!("{}/{href}", &location[..slash]),
                None => href.to_string(),
            },
            None => href.to_string(),
        }
    }

    // ── Frame loop ───────────────────────────────────────────────────

    /// Run one frame: drain queued input, refresh styles and layout where
    /// dirty, and paint.
    ///
    /// # Errors
    ///
    /// Only internal invariant violations ([`BugError`]) propagate; they
    /// abort the frame and should be reported to the host.
    pub fn frame(&mut self) -> Result<DisplayList, BugError> {
        let events: Vec<InputEvent> = self.events.drain_queue();
        for event in events {
            self.pump(&event);
        }
        self.restyle_if_needed();
        self.relayout_if_needed()?;
        Ok(build_display_list(&self.tree, &self.styles, &self.layout))
    }

    /// Re-cascade and recompute when styles are dirty or the sheet set
    /// changed.
    pub fn restyle_if_needed(&mut self) {
        if !self.tree.is_style_dirty() && self.cascaded_generation == self.sheet_generation {
            return;
        }
        let cascaded = cascaded_styles(&self.tree, &self.sheets, self.viewport);
        let env = StyleEnv {
            viewport: self.viewport,
            default_font_size: self.default_font_size,
        };
        self.styles = compute_tree(&self.tree, &cascaded, &env, &mut self.interner);
        self.interner.sweep();
        self.cascaded_generation = self.sheet_generation;
        self.tree.clear_style_dirty();
        self.tree.mark_layout_dirty(self.tree.root());
    }

    /// Re-run layout when geometry is dirty.
    ///
    /// # Errors
    ///
    /// Propagates [`BugError`] from the layout engine.
    pub fn relayout_if_needed(&mut self) -> Result<(), BugError> {
        if !self.tree.is_layout_dirty() {
            return Ok(());
        }
        let input = LayoutInput {
            tree: &self.tree,
            styles: &self.styles,
            metrics: &self.fonts,
            viewport: self.viewport,
        };
        self.layout = willow_css::layout_document(&input)?;
        self.sync_overflow();
        self.tree.clear_layout_dirty();
        Ok(())
    }

    /// After layout, record per-element overflow and clamp scroll
    /// offsets to the actual content.
    fn sync_overflow(&mut self) {
        let updates: Vec<(NodeId, f32, bool)> = self
            .layout
            .boxes
            .iter()
            .map(|(&id, entry)| {
                let visible = entry.css_box.height_of(BoxType::Content).max(0.0);
                let max_scroll = (entry.content_height - visible).max(0.0);
                (id, max_scroll, max_scroll > 0.0)
            })
            .collect();
        for (id, max_scroll, overflow) in updates {
            if let Some(data) = self.tree.as_element_mut(id) {
                data.overflow = overflow;
                data.scroll_y = data.scroll_y.clamp(0.0, max_scroll);
            }
        }
    }

    // ── Input and events ─────────────────────────────────────────────

    /// Process one input event immediately (the frame loop calls this for
    /// queued events).
    pub fn pump(&mut self, event: &InputEvent) {
        crate::events::pump(self, event);
    }

    /// The innermost element at a viewport position.
    #[must_use]
    pub fn hit_test(&self, x: f32, y: f32) -> Option<NodeId> {
        let root = self.tree.document_element()?;
        willow_css::hit_test(&self.tree, &self.layout, root, x, y)
    }

    /// The cursor keyword active at a viewport position (`auto` resolves
    /// through the ancestor chain, ending at `default`).
    #[must_use]
    pub fn cursor_at(&self, x: f32, y: f32) -> String {
        let Some(hit) = self.hit_test(x, y) else {
            return "default".to_string();
        };
        for id in std::iter::once(hit).chain(self.tree.ancestors(hit)) {
            match self.styles.get(&id).and_then(|s| s.get("cursor").cloned()) {
                Some(ComputedValue::Keyword(kw)) => return kw,
                Some(ComputedValue::Auto) | None => {}
                Some(_) => break,
            }
        }
        "default".to_string()
    }

    // ── Mutators (each sets the appropriate dirty bits) ──────────────

    /// Set a content attribute on an element.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        self.tree.set_attribute(id, name, value);
    }

    /// Replace an element's inline style text.
    pub fn set_inline_style(&mut self, id: NodeId, css_text: &str) {
        self.tree.set_attribute(id, "style", css_text);
    }

    /// Flip runtime state bits on an element.
    pub fn set_state(&mut self, id: NodeId, f: impl FnOnce(&mut StateFlags)) {
        self.tree.set_state(id, f);
    }

    // ── Navigation state ─────────────────────────────────────────────

    /// Record a visited link target and refresh `:visited` bits.
    pub fn mark_visited(&mut self, url: &str) {
        let _ = self.visited.insert(url.to_string());
        self.apply_visited_bits();
    }

    fn apply_visited_bits(&mut self) {
        let anchors: Vec<(NodeId, bool)> = self
            .tree
            .iter_all()
            .filter_map(|id| {
                let data = self.tree.as_element(id)?;
                if !data.tag_name.eq_ignore_ascii_case("a") {
                    return None;
                }
                let href = data.attr("href")?;
                Some((id, self.visited.contains(href)))
            })
            .collect();
        for (id, visited) in anchors {
            self.tree.set_state(id, |s| s.visited = visited);
        }
    }
}
