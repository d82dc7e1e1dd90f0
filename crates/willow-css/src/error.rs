//! Error types for the style and layout pipeline.
//!
//! Malformed CSS never produces an error past a component boundary: bad
//! declarations are dropped with a diagnostic and bad rules are skipped.
//! Only two kinds of error propagate out of this crate:
//!
//! - [`InvalidSelector`], surfaced from the selector parser because the
//!   public API demands it, and
//! - [`BugError`], an internal invariant violation that aborts the current
//!   frame and is reported to the host.

use thiserror::Error;

/// A selector string that could not be parsed.
///
/// Carries the offending substring so the host can point at it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector: {0}")]
pub struct InvalidSelector(pub String);

/// An internal invariant violation.
///
/// This should never occur; if it does, something needs to be fixed.
/// The engine aborts the current frame and reports it to the host rather
/// than painting from inconsistent state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("engine bug: {0}")]
pub struct BugError(pub String);

impl BugError {
    /// Create a bug error from anything printable.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
