//! The published radius of a namespace.

use std::sync::Arc;

use arc_swap::ArcSwap;
use portal_primitives::Distance;

/// Single-slot, atomically replaced radius.
///
/// Readers never lock and never see a partially written value. Only the
/// namespace's writer publishes, and it always replaces the whole value.
#[derive(Debug)]
pub struct SharedRadius {
    inner: ArcSwap<Distance>,
}

impl SharedRadius {
    /// Start at `radius`.
    pub fn new(radius: Distance) -> Self {
        Self {
            inner: ArcSwap::from_pointee(radius),
        }
    }

    /// The last published radius.
    #[inline]
    pub fn load(&self) -> Distance {
        **self.inner.load()
    }

    /// Publish a new radius.
    pub(crate) fn store(&self, radius: Distance) {
        self.inner.store(Arc::new(radius));
    }
}

impl Default for SharedRadius {
    fn default() -> Self {
        Self::new(Distance::MAX)
    }
}
