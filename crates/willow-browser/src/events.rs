//! Event plumbing: input events, state bits, and bubbling dispatch.
//!
//! [UI Events](https://www.w3.org/TR/uievents/)
//!
//! Pointer movement hit-tests the box tree and moves the `:hover` bit;
//! pressing moves `:active` and `:focus`; releasing over the active
//! element dispatches a `click` that bubbles from the target through its
//! ancestors, calling registered listeners synchronously. State bits only
//! dirty styles when they actually change, so an idle pointer costs
//! nothing.
//!
//! Scroll events walk up from the hit element to the nearest scrollable
//! box and adjust its offset, dirtying layout positions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use willow_dom::NodeId;

use crate::engine::Engine;

/// An input event from the host's windowing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The pointer moved to a viewport position.
    PointerMove {
        /// Viewport x.
        x: f32,
        /// Viewport y.
        y: f32,
    },
    /// The primary button went down.
    PointerDown {
        /// Viewport x.
        x: f32,
        /// Viewport y.
        y: f32,
    },
    /// The primary button came up.
    PointerUp {
        /// Viewport x.
        x: f32,
        /// Viewport y.
        y: f32,
    },
    /// A scroll wheel tick over a position.
    Scroll {
        /// Viewport x.
        x: f32,
        /// Viewport y.
        y: f32,
        /// Scroll delta in px (positive scrolls down).
        delta: f32,
    },
}

/// A DOM-style event delivered to listeners.
#[derive(Debug, Clone)]
pub struct Event {
    /// The event name (`click`, `mousedown`, ...).
    pub kind: String,
    /// The innermost element the event happened on.
    pub target: NodeId,
    /// The element whose listener is currently running (bubbles from
    /// `target` up the ancestor chain).
    pub current: NodeId,
}

/// A registered event callback.
///
/// Listeners run synchronously from the dispatcher; any async scheduling
/// of user code is the host's concern.
pub type Listener = Rc<RefCell<dyn FnMut(&mut Engine, &Event)>>;

/// Pointer state, listeners, and the input queue.
#[derive(Default)]
pub struct EventManager {
    /// The element under the pointer.
    pub hover: Option<NodeId>,
    /// The element holding focus.
    pub focus: Option<NodeId>,
    /// The element the primary button is down on.
    pub active: Option<NodeId>,
    listeners: HashMap<(NodeId, String), Vec<Listener>>,
    queue: Vec<InputEvent>,
}

impl EventManager {
    /// A fresh manager with no state and no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an input event for the next frame.
    pub fn push_event(&mut self, event: InputEvent) {
        self.queue.push(event);
    }

    /// Take all queued events.
    #[must_use]
    pub fn drain_queue(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.queue)
    }

    /// Register a listener for an event kind on an element.
    pub fn add_listener(
        &mut self,
        target: NodeId,
        kind: &str,
        listener: impl FnMut(&mut Engine, &Event) + 'static,
    ) {
        self.listeners
            .entry((target, kind.to_string()))
            .or_default()
            .push(Rc::new(RefCell::new(listener)));
    }

    fn listeners_for(&self, target: NodeId, kind: &str) -> Vec<Listener> {
        self.listeners
            .get(&(target, kind.to_string()))
            .map(|v| v.clone())
            .unwrap_or_default()
    }
}

/// Process one input event against the engine.
pub fn pump(engine: &mut Engine, event: &InputEvent) {
    match *event {
        InputEvent::PointerMove { x, y } => {
            let hit = engine.hit_test(x, y);
            change_hover(engine, hit);
        }
        InputEvent::PointerDown { x, y } => {
            let hit = engine.hit_test(x, y);
            change_hover(engine, hit);
            change_state(engine, hit, |s, on| s.active = on, |m| &mut m.active);
            change_state(engine, hit, |s, on| s.focus = on, |m| &mut m.focus);
            if let Some(target) = hit {
                dispatch(engine, "mousedown", target);
            }
        }
        InputEvent::PointerUp { x, y } => {
            let hit = engine.hit_test(x, y);
            let was_active = engine.events.active;
            change_state(engine, None, |s, on| s.active = on, |m| &mut m.active);
            if let Some(target) = hit {
                dispatch(engine, "mouseup", target);
                // a click is a press and release over the same element
                if was_active == Some(target) {
                    dispatch(engine, "click", target);
                }
            }
        }
        InputEvent::Scroll { x, y, delta } => {
            scroll_at(engine, x, y, delta);
        }
    }
}

fn change_hover(engine: &mut Engine, hit: Option<NodeId>) {
    change_state(engine, hit, |s, on| s.hover = on, |m| &mut m.hover);
}

/// Move a pointer state bit from its previous holder to `next`, flipping
/// the element state bits (which dirties styles only on real change).
fn change_state(
    engine: &mut Engine,
    next: Option<NodeId>,
    set_bit: impl Fn(&mut willow_dom::StateFlags, bool) + Copy,
    slot: impl Fn(&mut EventManager) -> &mut Option<NodeId>,
) {
    let previous = *slot(&mut engine.events);
    if previous == next {
        return;
    }
    if let Some(old) = previous {
        engine.set_state(old, |s| set_bit(s, false));
    }
    if let Some(new) = next {
        engine.set_state(new, |s| set_bit(s, true));
    }
    *slot(&mut engine.events) = next;
}

/// Dispatch an event, bubbling from the target through its ancestors.
pub fn dispatch(engine: &mut Engine, kind: &str, target: NodeId) {
    let chain: Vec<NodeId> = std::iter::once(target)
        .chain(engine.tree.ancestors(target).collect::<Vec<_>>())
        .collect();
    for current in chain {
        let listeners = engine.events.listeners_for(current, kind);
        for listener in listeners {
            let event = Event {
                kind: kind.to_string(),
                target,
                current,
            };
            (listener.borrow_mut())(engine, &event);
        }
    }
}

/// Scroll the nearest scrollable ancestor of the element under the
/// pointer.
fn scroll_at(engine: &mut Engine, x: f32, y: f32, delta: f32) {
    let Some(hit) = engine.hit_test(x, y) else {
        return;
    };
    // find the closest element that actually overflows
    let scroller = std::iter::once(hit)
        .chain(engine.tree.ancestors(hit))
        .find(|&id| engine.tree.as_element(id).is_some_and(|data| data.overflow));
    let Some(scroller) = scroller else { return };

    let max_scroll = engine.layout.get(scroller).map_or(0.0, |entry| {
        let visible = entry
            .css_box
            .height_of(willow_css::layout::BoxType::Content)
            .max(0.0);
        (entry.content_height - visible).max(0.0)
    });
    let changed = match engine.tree.as_element_mut(scroller) {
        Some(data) => {
            let next = (data.scroll_y + delta).clamp(0.0, max_scroll);
            let changed = (next - data.scroll_y).abs() > f32::EPSILON;
            data.scroll_y = next;
            changed
        }
        None => false,
    };
    if changed {
        engine.tree.mark_layout_dirty(scroller);
        dispatch(engine, "scroll", scroller);
    }
}
