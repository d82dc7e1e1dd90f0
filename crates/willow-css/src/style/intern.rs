//! Computed-style interning.
//!
//! Elements with identical computed styles share one frozen instance. The
//! pool is keyed by the structural hash of the whole map and holds weak
//! references, so an entry lives exactly as long as some element still
//! holds the `Arc`; dead entries are swept opportunistically on insert.

use std::collections::HashMap;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::style::ComputedStyle;

/// The shared computed-style pool.
#[derive(Debug, Default)]
pub struct StyleInterner {
    /// structural hash → candidate entries (hash collisions share a bucket)
    pool: HashMap<u64, Vec<Weak<ComputedStyle>>>,
}

impl StyleInterner {
    /// An empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a computed style: returns the existing shared instance when
    /// an equal map is alive, otherwise stores this one.
    pub fn intern(&mut self, style: ComputedStyle) -> Arc<ComputedStyle> {
        let key = structural_hash(&style);
        let bucket = self.pool.entry(key).or_default();
        bucket.retain(|weak| weak.strong_count() > 0);
        for weak in bucket.iter() {
            if let Some(existing) = weak.upgrade() {
                if *existing == style {
                    return existing;
                }
            }
        }
        let arc = Arc::new(style);
        bucket.push(Arc::downgrade(&arc));
        arc
    }

    /// Drop all dead entries and empty buckets.
    pub fn sweep(&mut self) {
        self.pool.retain(|_, bucket| {
            bucket.retain(|weak| weak.strong_count() > 0);
            !bucket.is_empty()
        });
    }

    /// Number of live interned styles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool
            .values()
            .map(|bucket| bucket.iter().filter(|w| w.strong_count() > 0).count())
            .sum()
    }

    /// Whether no interned style is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn structural_hash(style: &ComputedStyle) -> u64 {
    let mut hasher = DefaultHasher::new();
    style.hash(&mut hasher);
    hasher.finish()
}
