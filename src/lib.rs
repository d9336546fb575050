pub mod nav;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Log a message every 100 navigation ticks when the `perf_stats` feature
/// is enabled.
///
/// ```ignore
/// profile_log!(tick, "[NAV_MOVE] Resolved {} agents", agents.iter().len());
/// ```
///
/// Without `perf_stats` this expands to an empty block and the arguments are
/// never evaluated.
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {
        if $tick.0 % 100 == 0 {
            bevy::prelude::info!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($tick:expr, $($arg:tt)*) => {};
}
