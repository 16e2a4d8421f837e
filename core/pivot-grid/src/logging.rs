//! FILENAME: core/pivot-grid/src/logging.rs
// PURPOSE: Category logging macros over the `log` facade.
//
// The category becomes the log target, so hosts can filter e.g. `SORT`
// independently of `ADAPTER`.

// ============================================================================
// MACRO DEFINITIONS & EXPORTS
// ============================================================================

macro_rules! log_debug {
    ($cat:expr, $($arg:tt)*) => {
        ::log::debug!(target: $cat, $($arg)*)
    };
}

macro_rules! log_info {
    ($cat:expr, $($arg:tt)*) => {
        ::log::info!(target: $cat, $($arg)*)
    };
}

macro_rules! log_warn {
    ($cat:expr, $($arg:tt)*) => {
        ::log::warn!(target: $cat, $($arg)*)
    };
}

// Re-export the macros so they can be imported via `use crate::logging::log_debug;`
pub(crate) use log_debug;
pub(crate) use log_info;
pub(crate) use log_warn;
