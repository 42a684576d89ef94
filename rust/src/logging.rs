//! Stderr logging for route searches and task dispatch.
//!
//! `SearchConfig::verbosity` and `DispatchConfig::verbosity` pick how much
//! is written. At 0 the macros expand to a single comparison and their
//! format arguments are never evaluated.

pub const VERBOSITY_SILENT: u8 = 0;
/// One line per finished search and per dispatched task.
pub const VERBOSITY_EVENTS: u8 = 1;
/// Adds a line per expanded node and per queued task.
pub const VERBOSITY_STEPS: u8 = 2;
/// Adds a line per edge relaxation and per skipped heap entry.
pub const VERBOSITY_TRACE: u8 = 3;

/// Whether output at `level` is written under `verbosity`.
#[inline]
pub const fn enabled(verbosity: u8, level: u8) -> bool {
    level != VERBOSITY_SILENT && verbosity >= level
}

/// Log at EVENTS level.
///
/// Used for: route found (cost, hop count), no route between two nodes,
/// task dispatched with its priority and the remaining queue length.
#[macro_export]
macro_rules! log_events {
    ($verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $crate::logging::VERBOSITY_EVENTS) {
            eprintln!($($arg)*);
        }
    };
}

/// Log at STEPS level.
///
/// Used for: each node popped from the open set with its `g` and `f`,
/// each task entry pushed onto the dispatch heap.
#[macro_export]
macro_rules! log_steps {
    ($verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $crate::logging::VERBOSITY_STEPS) {
            eprintln!($($arg)*);
        }
    };
}

/// Log at TRACE level.
///
/// Used for: improved neighbor costs, stale open-set entries, relaxations
/// dropped because the path cost would overflow. Runs inside the A* inner
/// loop, so keep arguments cheap.
#[macro_export]
macro_rules! log_trace {
    ($verbosity:expr, $($arg:tt)*) => {
        if $crate::logging::enabled($verbosity, $crate::logging::VERBOSITY_TRACE) {
            eprintln!($($arg)*);
        }
    };
}
