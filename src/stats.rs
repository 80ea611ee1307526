use std::fmt;

use crate::cache::AccessResult;

/// Running hit/miss/eviction counters for one simulation.
///
/// An eviction always counts as a miss as well, so `evictions <= misses` and
/// `hits + misses` equals the number of accesses classified.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Counts one classified access.
    pub fn record(&mut self, result: AccessResult) {
        match result {
            AccessResult::Hit => self.hits += 1,
            AccessResult::Miss => self.misses += 1,
            AccessResult::MissEviction => {
                self.misses += 1;
                self.evictions += 1;
            }
        }
    }

    /// Total accesses classified so far.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_each_outcome() {
        let mut stats = CacheStats::default();
        stats.record(AccessResult::Hit);
        stats.record(AccessResult::Miss);
        stats.record(AccessResult::MissEviction);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.evictions, 1);
        assert_eq!(stats.accesses(), 3);
    }

    #[test]
    fn summary_line_format() {
        let stats = CacheStats {
            hits: 4,
            misses: 5,
            evictions: 3,
        };
        assert_eq!(stats.to_string(), "hits:4 misses:5 evictions:3");
    }
}
