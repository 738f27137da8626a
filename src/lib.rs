pub mod nav;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message on every 100 000th event when the perf_stats feature is enabled.
///
/// Intended for hot loops such as node expansion, where logging every event
/// would drown the output. When the perf_stats feature is disabled, this macro
/// compiles to nothing - zero runtime cost.
///
/// # Example
/// ```ignore
/// profile_log!(stats.nodes_expanded, "Expanded {} nodes", stats.nodes_expanded);
/// ```
///
/// # Zero-Cost Abstraction
/// When compiled without the `perf_stats` feature, this expands to an empty block.
/// Even the arguments are not evaluated.
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {
        if $counter % 100_000 == 0 {
            ::tracing::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {};
}
