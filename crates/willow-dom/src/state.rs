//! Dynamic element state bits.
//!
//! [HTML § Pseudo-classes](https://html.spec.whatwg.org/multipage/semantics-other.html#pseudo-classes)
//!
//! These are the bits that change at runtime in response to user input or
//! navigation. Bits derived from content attributes (`disabled`, `required`)
//! are not stored here; they are read straight off the attribute map by
//! [`crate::ElementData::state_bit`].

/// Runtime state bits for one element.
///
/// Flipping any of these through [`crate::DomTree::set_state`] dirties the
/// element's style, since state pseudo-class selectors may start or stop
/// matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateFlags {
    /// The pointer is over this element (innermost hit only).
    pub hover: bool,
    /// This element holds keyboard focus.
    pub focus: bool,
    /// The primary button is held down on this element.
    pub active: bool,
    /// The element's link target has been visited this session.
    pub visited: bool,
    /// Checkbox/radio checked state.
    pub checked: bool,
    /// Form validity as determined by the host.
    pub valid: bool,
}
