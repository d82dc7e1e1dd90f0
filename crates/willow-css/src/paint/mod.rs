//! Painting: turning a laid-out tree into a display list.
//!
//! [CSS 2.1 Appendix E](https://www.w3.org/TR/CSS2/zindex.html)
//!
//! The core never rasterizes; it emits backend-agnostic drawing commands
//! in painting order and the host's surface executes them.

pub mod display_list;

pub use display_list::{DisplayCommand, DisplayList, build_display_list};
