//! Error type shared by the graph, search and dispatch components.

use pyo3::exceptions::PyValueError;
use pyo3::PyErr;
use thiserror::Error;

/// Precondition violations raised by the kernel.
///
/// "No path" and "no task to dispatch" are not errors; they come back as
/// empty results.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    #[error("Invalid size: {0} (must be non-negative)")]
    InvalidSize(i64),
    #[error("Index {index} out of range (valid bound: {bound})")]
    OutOfRange { index: i64, bound: usize },
    #[error("Invalid edge weight: {0} (must be non-negative)")]
    InvalidWeight(i64),
    #[error("Unknown heuristic: {0}")]
    UnknownHeuristic(String),
    #[error("Coordinate table has {found} entries, graph has {expected} nodes")]
    MissingCoordinates { expected: usize, found: usize },
    #[error("No free dispatch slot (capacity {0})")]
    CapacityExhausted(usize),
}

pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    pub(crate) fn out_of_range(index: usize, bound: usize) -> Self {
        KernelError::OutOfRange {
            index: i64::try_from(index).unwrap_or(i64::MAX),
            bound,
        }
    }
}

/// Convert a signed size coming from a caller into a `usize`.
pub fn checked_size(raw: i64) -> KernelResult<usize> {
    usize::try_from(raw).map_err(|_| KernelError::InvalidSize(raw))
}

/// Convert a signed index coming from a caller into a `usize`.
///
/// Negative values are reported as `OutOfRange` against `bound`; the upper
/// bound itself is checked by the component that owns the index.
pub fn checked_index(raw: i64, bound: usize) -> KernelResult<usize> {
    usize::try_from(raw).map_err(|_| KernelError::OutOfRange { index: raw, bound })
}

impl From<KernelError> for PyErr {
    fn from(err: KernelError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}
