//! Common utilities for the Willow rendering engine.
//!
//! This crate provides shared infrastructure used by all engine components:
//! - **Warning System** - colored terminal output for unsupported features
//! - **Fetching** - blocking byte/text retrieval for host glue code

pub mod net;
pub mod warning;
