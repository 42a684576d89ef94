//! Configuration types for path search and task dispatch.

use pyo3::prelude::*;

/// Configuration for an A* search.
#[pyclass]
#[derive(Clone, Debug)]
pub struct SearchConfig {
    /// Heuristic name: "id_distance", "zero", or "manhattan"
    #[pyo3(get, set)]
    pub heuristic: String,
    /// Verbosity level: 0=silent, 1=events, 2=steps, 3=trace
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            heuristic: "id_distance".to_string(),
            verbosity: 0,
        }
    }
}

#[pymethods]
impl SearchConfig {
    #[new]
    #[pyo3(signature = (heuristic=None, verbosity=None))]
    fn new(heuristic: Option<String>, verbosity: Option<u8>) -> Self {
        let defaults = Self::default();
        Self {
            heuristic: heuristic.unwrap_or(defaults.heuristic),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "SearchConfig(heuristic={:?}, verbosity={})",
            self.heuristic, self.verbosity
        )
    }
}

/// Configuration for a task dispatcher.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct DispatchConfig {
    /// Verbosity level: 0=silent, 1=events, 2=steps, 3=trace
    #[pyo3(get, set)]
    pub verbosity: u8,
}

#[pymethods]
impl DispatchConfig {
    #[new]
    #[pyo3(signature = (verbosity=None))]
    fn new(verbosity: Option<u8>) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!("DispatchConfig(verbosity={})", self.verbosity)
    }
}
