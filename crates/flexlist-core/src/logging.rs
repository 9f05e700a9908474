//! Logging facilities for flexlist.
//!
//! Every subsystem logs under its own target in [`targets`]. flexlist never
//! installs a subscriber; applications install one:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("flexlist::registry=debug,flexlist::projector=trace")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```

/// Span names used throughout flexlist for tracing.
pub mod span_names {
    /// Full re-scan of the collection after a reset or re-registration.
    pub const RESCAN: &str = "flexlist::rescan";
    /// Signal emission span.
    pub const SIGNAL: &str = "flexlist::signal";
    /// Drag gesture span.
    pub const GESTURE: &str = "flexlist::gesture";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core target.
    pub const CORE: &str = "flexlist_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "flexlist_core::signal";
    /// Observable collection target.
    pub const COLLECTION: &str = "flexlist::collection";
    /// Type registry target.
    pub const REGISTRY: &str = "flexlist::registry";
    /// Selection target.
    pub const SELECTION: &str = "flexlist::selection";
    /// Update projector target.
    pub const PROJECTOR: &str = "flexlist::projector";
    /// Drag/swipe gesture target.
    pub const GESTURE: &str = "flexlist::gesture";
    /// Performance spans.
    pub const PERF: &str = "flexlist::perf";
}

/// Keeps a `perf` span entered until dropped, timing the enclosing scope.
#[derive(Debug)]
pub struct PerfSpan {
    _entered: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Enters a span named after `operation`, usually one of [`span_names`].
    pub fn new(operation: &'static str) -> Self {
        let span = tracing::info_span!(target: targets::PERF, "perf", operation);
        Self {
            _entered: span.entered(),
        }
    }
}

/// `tracing::trace!` under the core target.
#[macro_export]
macro_rules! flex_trace {
    ($($arg:tt)*) => {
        tracing::trace!(target: "flexlist_core", $($arg)*)
    };
}

/// `tracing::debug!` under the core target.
#[macro_export]
macro_rules! flex_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: "flexlist_core", $($arg)*)
    };
}

/// `tracing::info!` under the core target.
#[macro_export]
macro_rules! flex_info {
    ($($arg:tt)*) => {
        tracing::info!(target: "flexlist_core", $($arg)*)
    };
}

/// `tracing::warn!` under the core target.
#[macro_export]
macro_rules! flex_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: "flexlist_core", $($arg)*)
    };
}

/// `tracing::error!` under the core target.
#[macro_export]
macro_rules! flex_error {
    ($($arg:tt)*) => {
        tracing::error!(target: "flexlist_core", $($arg)*)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span() {
        let _span = PerfSpan::new(span_names::RESCAN);
        crate::flex_debug!(rows = 3, "inside perf span");
        crate::flex_trace!("trace");
        crate::flex_info!("info");
        crate::flex_warn!("warn");
    }

    #[test]
    fn test_targets_share_prefixes() {
        for target in [
            targets::COLLECTION,
            targets::REGISTRY,
            targets::SELECTION,
            targets::PROJECTOR,
            targets::GESTURE,
            targets::PERF,
        ] {
            assert!(target.starts_with("flexlist::"));
        }
        assert!(targets::SIGNAL.starts_with(targets::CORE));
    }
}
