use log::debug;

use crate::config::CacheConfig;

/// Classification of a single cache access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessResult {
    Hit,
    Miss,
    /// A miss that displaced a valid line because the set was full.
    MissEviction,
}

impl AccessResult {
    /// Label used by the verbose trace echo.
    pub fn label(self) -> &'static str {
        match self {
            AccessResult::Hit => "hit",
            AccessResult::Miss => "miss",
            AccessResult::MissEviction => "miss eviction",
        }
    }
}

#[derive(Clone, Copy, Default)]
struct Line {
    tag: u64,
    valid: bool,
}

/// Set-associative cache state with LRU replacement.
///
/// Each set is a slice of `ways` lines ordered from most recently used at
/// position 0 to least recently used at the tail; recency lives in the
/// position, not in the line.
pub struct Cache {
    lines: Vec<Line>, // index = (set * ways) + position
    ways: usize,
    config: CacheConfig,
}

impl Cache {
    /// Builds an empty cache; every line starts invalid.
    pub fn new(config: CacheConfig) -> Self {
        let ways = config.ways();
        let lines = vec![Line::default(); config.set_count() as usize * ways];
        debug!(
            "cache geometry: {} sets x {} ways, {}-bit block offset",
            config.set_count(),
            ways,
            config.block_bits()
        );
        Self {
            lines,
            ways,
            config,
        }
    }

    /// Simulates one access and reorders the target set.
    ///
    /// The scans run in recency order: first for a valid line with the
    /// matching tag, then for a free slot, and failing both the tail of the
    /// set is evicted. Whichever line ends up holding the block is promoted
    /// to the front, shifting the lines above it down one position.
    pub fn access(&mut self, addr: u64) -> AccessResult {
        let tag = self.config.tag(addr);
        let set_index = self.config.set_index(addr);
        let set = self.set_mut(set_index);

        if let Some(pos) = set.iter().position(|line| line.valid && line.tag == tag) {
            set[..=pos].rotate_right(1);
            return AccessResult::Hit;
        }

        if let Some(pos) = set.iter().position(|line| !line.valid) {
            set[pos] = Line { tag, valid: true };
            set[..=pos].rotate_right(1);
            return AccessResult::Miss;
        }

        // The tail is the least recently used line.
        let last = set.len() - 1;
        set[last] = Line { tag, valid: true };
        set.rotate_right(1);
        AccessResult::MissEviction
    }

    /// Reports whether the block holding `addr` is resident, without touching
    /// the recency order.
    pub fn contains(&self, addr: u64) -> bool {
        let tag = self.config.tag(addr);
        self.set(self.config.set_index(addr))
            .iter()
            .any(|line| line.valid && line.tag == tag)
    }

    fn set(&self, set_index: u64) -> &[Line] {
        let base = set_index as usize * self.ways;
        &self.lines[base..base + self.ways]
    }

    fn set_mut(&mut self, set_index: u64) -> &mut [Line] {
        let base = set_index as usize * self.ways;
        &mut self.lines[base..base + self.ways]
    }
}
