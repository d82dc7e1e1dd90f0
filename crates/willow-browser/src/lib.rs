//! High-level engine API for Willow.
//!
//! # Scope
//!
//! This crate is the host-facing shell around the pure style/layout core:
//! - **Engine context** - the per-engine state that the source system kept
//!   in globals: document, sheet set, viewport, interner, dirty tracking,
//!   hover/focus/active, visited links
//! - **Document pipeline** - fetch, parse, cascade, compute, layout, paint
//! - **Event plumbing** - pointer/scroll input, state bits, bubbling
//!   dispatch to registered listeners
//! - **Font metrics** - fontdue-backed measurement with family fallback

pub mod engine;
pub mod events;
pub mod font_metrics;

pub use engine::Engine;
pub use events::{Event, EventManager, InputEvent};
pub use font_metrics::FontBook;

pub use willow_css as css;
pub use willow_dom as dom;
pub use willow_html as html;

use anyhow::Context as _;
use willow_common::net;

/// Load a document from a file path or URL into a fresh engine.
///
/// Convenience entry point for hosts and the CLI: fetches the bytes,
/// parses the HTML, collects `<style>` and `<link rel="stylesheet">`
/// sheets, and leaves the engine ready for its first
/// [`Engine::frame`].
///
/// # Errors
///
/// Returns an error when the document itself cannot be fetched or is not
/// UTF-8. Stylesheet fetch failures degrade to warnings; the page still
/// renders.
pub fn load_document(location: &str, viewport: (f32, f32)) -> anyhow::Result<Engine> {
    let html = net::fetch_text(location)
        .with_context(|| format!("failed to load document from '{location}'"))?;
    let mut engine = Engine::new(viewport);
    engine.load_html(&html, Some(location));
    Ok(engine)
}
