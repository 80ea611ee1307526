//! Set-associative cache simulator library.
//!
//! This crate replays memory-access traces against a model of a single-level,
//! set-associative, LRU-replacement cache and reports exact hit, miss, and
//! eviction counts. It provides:
//! 1. **Geometry:** validated cache configuration and address decomposition.
//! 2. **Engine:** the per-access state machine (hit scan, fill, LRU eviction).
//! 3. **Dispatch:** trace opcodes mapped to zero, one, or two accesses.
//! 4. **Statistics:** running counters and the summary report line.
//! 5. **Traces:** the `<op> <hex-address>,<size>` file format and reader.
//! 6. **Transpose:** the companion cache-aware matrix transpose kernels.

/// Cache state and the per-access transition function.
pub mod cache;
/// Validated cache geometry and address decomposition.
pub mod config;
/// Trace-entry dispatch and whole-trace simulation.
pub mod sim;
/// Hit/miss/eviction counters and summary reporting.
pub mod stats;
/// Trace file format: operations, entries, and the streaming reader.
pub mod trace;
/// Cache-aware matrix transpose kernels (standalone exercise).
pub mod transpose;

/// The cache engine; construct with `Cache::new` from a `CacheConfig`.
pub use crate::cache::{AccessResult, Cache};
/// Validated geometry; `CacheConfig::new` rejects impossible splits.
pub use crate::config::{CacheConfig, ConfigError};
/// Trace replay driver; owns the cache and its counters.
pub use crate::sim::{EntryOutcome, Simulator, verbose_line};
/// Counter triple with the `hits:.. misses:.. evictions:..` display.
pub use crate::stats::CacheStats;
/// Trace records and the line-oriented reader.
pub use crate::trace::{MemoryOp, TraceEntry, TraceReader};
