use crate::cache::{AccessResult, Cache};
use crate::config::CacheConfig;
use crate::stats::CacheStats;
use crate::trace::{MemoryOp, TraceEntry};

/// Cache accesses performed for one trace entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    /// Instruction fetches touch no modeled cache.
    Ignored,
    /// Loads and stores issue one access.
    Single(AccessResult),
    /// Modifies issue a load then a store to the same address.
    Double(AccessResult, AccessResult),
}

impl EntryOutcome {
    /// Outcome labels in issue order, or `None` for entries that issued no
    /// access.
    pub fn labels(&self) -> Option<String> {
        match self {
            EntryOutcome::Ignored => None,
            EntryOutcome::Single(result) => Some(result.label().to_string()),
            EntryOutcome::Double(load, store) => {
                Some(format!("{} {}", load.label(), store.label()))
            }
        }
    }
}

/// Replays trace entries against an owned cache, accumulating counters.
///
/// The engine itself never counts; every outcome it returns is recorded here,
/// once, as the access is issued.
pub struct Simulator {
    cache: Cache,
    stats: CacheStats,
}

impl Simulator {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            cache: Cache::new(config),
            stats: CacheStats::default(),
        }
    }

    /// Issues the accesses for one entry and records their outcomes.
    pub fn process(&mut self, entry: TraceEntry) -> EntryOutcome {
        match entry.op {
            MemoryOp::Instruction => EntryOutcome::Ignored,
            MemoryOp::Load | MemoryOp::Store => EntryOutcome::Single(self.touch(entry.addr)),
            MemoryOp::Modify => {
                // The load installs the line at the front of its set, so the
                // store half can never miss.
                let load = self.touch(entry.addr);
                let store = self.touch(entry.addr);
                EntryOutcome::Double(load, store)
            }
        }
    }

    /// Processes every entry of a trace in order.
    pub fn run<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = TraceEntry>,
    {
        for entry in entries {
            self.process(entry);
        }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    fn touch(&mut self, addr: u64) -> AccessResult {
        let result = self.cache.access(addr);
        self.stats.record(result);
        result
    }
}

/// Renders the verbose echo line for one processed entry, or `None` for
/// entries that are never echoed.
pub fn verbose_line(entry: TraceEntry, outcome: EntryOutcome) -> Option<String> {
    let labels = outcome.labels()?;
    Some(format!(
        "{} {:x},{} {}",
        entry.op, entry.addr, entry.size, labels
    ))
}
