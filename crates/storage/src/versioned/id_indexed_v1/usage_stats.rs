/// Row count and aggregate size of one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    /// Number of stored rows.
    pub entry_count: u64,
    /// Sum of `content_size` over all rows.
    pub total_entry_size_bytes: u64,
}

impl UsageStats {
    /// Account for a newly inserted row.
    pub(crate) fn on_store(&mut self, size_bytes: u64) {
        self.entry_count += 1;
        self.total_entry_size_bytes += size_bytes;
    }

    /// Account for a removed row.
    pub(crate) fn on_delete(&mut self, size_bytes: u64) {
        self.entry_count = self.entry_count.saturating_sub(1);
        self.total_entry_size_bytes = self.total_entry_size_bytes.saturating_sub(size_bytes);
    }

    /// Returns true if the stored bytes exceed `bytes`.
    pub fn is_above(&self, bytes: u64) -> bool {
        self.total_entry_size_bytes > bytes
    }

    /// Mean row size, or `None` for an empty namespace.
    pub fn average_entry_size_bytes(&self) -> Option<u64> {
        self.total_entry_size_bytes.checked_div(self.entry_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accounting() {
        let mut usage = UsageStats::default();
        assert_eq!(usage.average_entry_size_bytes(), None);

        usage.on_store(30);
        usage.on_store(50);
        assert_eq!(usage.entry_count, 2);
        assert_eq!(usage.average_entry_size_bytes(), Some(40));
        assert!(usage.is_above(79));
        assert!(!usage.is_above(80));

        usage.on_delete(50);
        assert_eq!(usage.total_entry_size_bytes, 30);
        usage.on_delete(30);
        usage.on_delete(30);
        assert_eq!(usage, UsageStats::default());
    }
}
