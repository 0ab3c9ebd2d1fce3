//! Pager statistics tracking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the pager.
///
/// All fields are atomic so they can be bumped through `&self`. Only
/// atomicity matters, so every access uses `Ordering::Relaxed`.
#[derive(Debug, Default)]
pub struct PagerStats {
    /// `get_page` calls served from the cache.
    pub cache_hits: AtomicU64,

    /// `get_page` calls that had to create a cache slot.
    pub cache_misses: AtomicU64,

    /// Pages read from the file on a miss.
    pub pages_read: AtomicU64,

    /// Pages written back by flushes.
    pub pages_written: AtomicU64,

    /// Misses beyond the on-disk extent that grew the page count.
    pub pages_allocated: AtomicU64,
}

impl PagerStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a plain copy of the current counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            pages_read: self.pages_read.load(Ordering::Relaxed),
            pages_written: self.pages_written.load(Ordering::Relaxed),
            pages_allocated: self.pages_allocated.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of [`PagerStats`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub pages_read: u64,
    pub pages_written: u64,
    pub pages_allocated: u64,
}

impl StatsSnapshot {
    /// Cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ hits: {}, misses: {}, read: {}, written: {}, allocated: {}, hit_rate: {:.2}% }}",
            self.cache_hits,
            self.cache_misses,
            self.pages_read,
            self.pages_written,
            self.pages_allocated,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = PagerStats::new();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
        assert_eq!(stats.snapshot().hit_rate(), 0.0);
    }

    #[test]
    fn test_stats_bump_and_snapshot() {
        let stats = PagerStats::new();
        for _ in 0..3 {
            PagerStats::bump(&stats.cache_hits);
        }
        PagerStats::bump(&stats.cache_misses);
        PagerStats::bump(&stats.pages_written);

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.cache_hits, 3);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.pages_written, 1);
        assert_eq!(snapshot.hit_rate(), 0.75);
    }

    #[test]
    fn test_stats_display() {
        let snapshot = StatsSnapshot {
            cache_hits: 80,
            cache_misses: 20,
            pages_read: 5,
            pages_written: 7,
            pages_allocated: 2,
        };
        let display = format!("{}", snapshot);

        assert!(display.contains("hits: 80"));
        assert!(display.contains("misses: 20"));
        assert!(display.contains("allocated: 2"));
        assert!(display.contains("80.00%"));
    }
}
