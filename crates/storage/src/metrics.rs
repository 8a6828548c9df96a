//! Content store metrics.

use metrics::{Counter, Gauge};
use portal_primitives::Distance;

use crate::versioned::ContentType;

/// Per-namespace storage metrics, labelled by content type.
#[derive(Clone, Debug)]
pub(crate) struct StorageMetrics {
    /// Published radius as a fraction of the maximum distance
    radius_ratio: Gauge,
    /// Number of stored rows
    entry_count: Gauge,
    /// Aggregate size of stored rows
    content_bytes: Gauge,
    /// Configured capacity
    capacity_bytes: Gauge,
    /// Rows removed by eviction
    evicted_total: Counter,
    /// Puts that inserted a new row
    inserted_total: Counter,
}

impl StorageMetrics {
    pub(crate) fn new(content_type: ContentType) -> Self {
        let label = content_type.to_string();
        Self {
            radius_ratio: metrics::gauge!("storage.radius_ratio", "content_type" => label.clone()),
            entry_count: metrics::gauge!("storage.entry_count", "content_type" => label.clone()),
            content_bytes: metrics::gauge!("storage.content_bytes", "content_type" => label.clone()),
            capacity_bytes: metrics::gauge!("storage.capacity_bytes", "content_type" => label.clone()),
            evicted_total: metrics::counter!("storage.evicted_total", "content_type" => label.clone()),
            inserted_total: metrics::counter!("storage.inserted_total", "content_type" => label),
        }
    }

    pub(crate) fn report_radius(&self, radius: Distance) {
        self.radius_ratio.set(radius.fraction_of_max());
    }

    pub(crate) fn report_usage(&self, entry_count: u64, content_bytes: u64) {
        self.entry_count.set(entry_count as f64);
        self.content_bytes.set(content_bytes as f64);
    }

    pub(crate) fn report_capacity(&self, capacity_bytes: u64) {
        self.capacity_bytes.set(capacity_bytes as f64);
    }

    pub(crate) fn inc_inserted(&self) {
        self.inserted_total.increment(1);
    }

    pub(crate) fn inc_evicted(&self, count: u64) {
        self.evicted_total.increment(count);
    }
}
