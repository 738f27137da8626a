//! Performance profiling utilities
//!
//! The timing guard is only compiled when the `perf_stats` feature is enabled.
//! Zero overhead when disabled.

// Re-export the profile macro
pub use idastar_macros::profile;
