//! Routing and dispatch kernel for facility logistics.
//!
//! Two independent pieces:
//! - [`WeightedGraph`] + [`find_path`]: A* routing between locations
//! - [`IndexedCounter`] + [`TaskDispatcher`]: priority dispatch with O(log n)
//!   priority-mass accounting
//!
//! The crate also builds as the `carepath.rust` Python extension module.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod config;
pub mod counter;
pub mod dispatcher;
mod error;
pub mod graph;
pub mod heuristic;
pub mod logging;
pub mod pathfinder;
pub mod slots;

pub use config::{DispatchConfig, SearchConfig};
pub use counter::{IndexedCounter, Mass};
pub use dispatcher::{Priority, TaskDispatcher, TaskId};
pub use error::{checked_index, checked_size, KernelError, KernelResult};
pub use graph::{NodeId, Weight, WeightedGraph};
pub use heuristic::{Heuristic, HeuristicKind, IdDistance, Manhattan, ZeroHeuristic};
pub use pathfinder::{
    find_path, find_route, find_route_by_name, find_route_with_config, Route,
};
pub use slots::{KeyedDispatcher, SlotTable};

/// Weighted graph (PyO3 wrapper).
#[pyclass(name = "WeightedGraph")]
#[derive(Clone, Debug)]
pub struct PyWeightedGraph {
    inner: WeightedGraph,
}

#[pymethods]
impl PyWeightedGraph {
    #[new]
    fn new(node_count: i64) -> PyResult<Self> {
        Ok(Self {
            inner: WeightedGraph::checked_new(node_count)?,
        })
    }

    fn add_edge(&mut self, u: i64, v: i64, weight: i64) -> PyResult<()> {
        let bound = self.inner.node_count();
        let u = checked_index(u, bound)?;
        let v = checked_index(v, bound)?;
        self.inner.add_edge(u, v, weight)?;
        Ok(())
    }

    fn neighbors(&self, node: i64) -> PyResult<Vec<(NodeId, Weight)>> {
        let node = checked_index(node, self.inner.node_count())?;
        Ok(self.inner.neighbors(node)?.to_vec())
    }

    /// Total weight of a node sequence, or None if a hop is not an edge.
    fn path_weight(&self, path: Vec<i64>) -> Option<Weight> {
        let nodes = path
            .into_iter()
            .map(|n| usize::try_from(n).ok())
            .collect::<Option<Vec<NodeId>>>()?;
        self.inner.path_weight(&nodes)
    }

    #[getter]
    fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    #[getter]
    fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    fn __repr__(&self) -> String {
        format!(
            "WeightedGraph(nodes={}, edges={})",
            self.inner.node_count(),
            self.inner.edge_count()
        )
    }
}

/// Resolve endpoints and run a search configured from Python.
fn run_search(
    graph: &PyWeightedGraph,
    start: i64,
    goal: i64,
    config: Option<SearchConfig>,
    coordinates: Option<Vec<(i64, i64)>>,
) -> PyResult<Option<Route>> {
    let bound = graph.inner.node_count();
    let start = checked_index(start, bound)?;
    let goal = checked_index(goal, bound)?;
    let config = config.unwrap_or_default();
    Ok(find_route_by_name(
        &graph.inner,
        start,
        goal,
        &config,
        coordinates,
    )?)
}

/// Find a route between two nodes.
///
/// # Arguments
/// * `graph` - Graph to search
/// * `start`, `goal` - Node identifiers
/// * `config` - SearchConfig (heuristic name, verbosity); defaults to id_distance
/// * `coordinates` - One (x, y) per node, required for the "manhattan" heuristic
///
/// # Returns
/// * List of node ids from start to goal, empty if no route exists
///
/// # Raises
/// * ValueError for out-of-range nodes, unknown heuristics, or bad coordinates
#[pyfunction]
#[pyo3(name = "find_path", signature = (graph, start, goal, config=None, coordinates=None))]
fn py_find_path(
    graph: PyRef<'_, PyWeightedGraph>,
    start: i64,
    goal: i64,
    config: Option<SearchConfig>,
    coordinates: Option<Vec<(i64, i64)>>,
) -> PyResult<Vec<NodeId>> {
    Ok(run_search(&graph, start, goal, config, coordinates)?
        .map(|route| route.nodes)
        .unwrap_or_default())
}

/// Like `find_path`, returning `(nodes, total_weight)` or None.
#[pyfunction]
#[pyo3(name = "find_route", signature = (graph, start, goal, config=None, coordinates=None))]
fn py_find_route(
    graph: PyRef<'_, PyWeightedGraph>,
    start: i64,
    goal: i64,
    config: Option<SearchConfig>,
    coordinates: Option<Vec<(i64, i64)>>,
) -> PyResult<Option<(Vec<NodeId>, Weight)>> {
    Ok(run_search(&graph, start, goal, config, coordinates)?
        .map(|route| (route.nodes, route.total_weight)))
}

/// Fenwick tree (PyO3 wrapper).
#[pyclass(name = "IndexedCounter")]
#[derive(Clone, Debug)]
pub struct PyIndexedCounter {
    inner: IndexedCounter,
}

#[pymethods]
impl PyIndexedCounter {
    #[new]
    fn new(size: i64) -> PyResult<Self> {
        Ok(Self {
            inner: IndexedCounter::checked_new(size)?,
        })
    }

    fn update(&mut self, index: i64, delta: i64) -> PyResult<()> {
        let index = checked_index(index, self.inner.len())?;
        Ok(self.inner.update(index, delta)?)
    }

    fn query(&self, index: i64) -> PyResult<Mass> {
        let index = checked_index(index, self.inner.len())?;
        Ok(self.inner.query(index)?)
    }

    fn point_value(&self, index: i64) -> PyResult<Mass> {
        let index = checked_index(index, self.inner.len())?;
        Ok(self.inner.point_value(index)?)
    }

    fn range_sum(&self, lo: i64, hi: i64) -> PyResult<Mass> {
        let lo = checked_index(lo, self.inner.len())?;
        let hi = checked_index(hi, self.inner.len())?;
        Ok(self.inner.range_sum(lo, hi)?)
    }

    fn total(&self) -> Mass {
        self.inner.total()
    }

    fn lower_bound(&self, target: i64) -> Option<usize> {
        self.inner.lower_bound(Mass::from(target))
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "IndexedCounter(size={}, total={})",
            self.inner.len(),
            self.inner.total()
        )
    }
}

/// Task dispatcher (PyO3 wrapper).
#[pyclass(name = "TaskDispatcher")]
#[derive(Clone, Debug)]
pub struct PyTaskDispatcher {
    inner: TaskDispatcher,
}

#[pymethods]
impl PyTaskDispatcher {
    #[new]
    #[pyo3(signature = (capacity, config=None))]
    fn new(capacity: i64, config: Option<DispatchConfig>) -> PyResult<Self> {
        Ok(Self {
            inner: TaskDispatcher::checked_new(capacity, config.unwrap_or_default())?,
        })
    }

    fn add_task(&mut self, task_id: i64, priority: Priority) -> PyResult<()> {
        let task_id = checked_index(task_id, self.inner.capacity())?;
        Ok(self.inner.add_task(task_id, priority)?)
    }

    /// Highest-priority task id, or None when nothing is queued.
    fn dispatch_next_task(&mut self) -> Option<TaskId> {
        self.inner.dispatch_next_task()
    }

    fn peek(&self) -> Option<(TaskId, Priority)> {
        self.inner.peek()
    }

    fn queued_priority(&self, task_id: i64) -> PyResult<Mass> {
        let task_id = checked_index(task_id, self.inner.capacity())?;
        Ok(self.inner.queued_priority(task_id)?)
    }

    fn queued_mass(&self) -> Mass {
        self.inner.queued_mass()
    }

    #[getter]
    fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "TaskDispatcher(capacity={}, queued={})",
            self.inner.capacity(),
            self.inner.len()
        )
    }
}

/// Dispatcher addressed by string keys (PyO3 wrapper).
#[pyclass(name = "KeyedDispatcher")]
#[derive(Clone, Debug)]
pub struct PyKeyedDispatcher {
    inner: KeyedDispatcher,
}

#[pymethods]
impl PyKeyedDispatcher {
    #[new]
    #[pyo3(signature = (capacity, config=None))]
    fn new(capacity: i64, config: Option<DispatchConfig>) -> PyResult<Self> {
        let capacity = checked_size(capacity)?;
        Ok(Self {
            inner: KeyedDispatcher::with_config(capacity, config.unwrap_or_default()),
        })
    }

    /// Queue a task under `key`; returns the slot it occupies.
    fn add_task(&mut self, key: &str, priority: Priority) -> PyResult<TaskId> {
        Ok(self.inner.add_task(key, priority)?)
    }

    fn dispatch_next_task(&mut self) -> Option<String> {
        self.inner.dispatch_next_task()
    }

    fn queued_priority(&self, key: &str) -> Option<Mass> {
        self.inner.queued_priority(key)
    }

    fn __len__(&self) -> usize {
        self.inner.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "KeyedDispatcher(keys={}, queued={})",
            self.inner.slots().len(),
            self.inner.len()
        )
    }
}

/// The carepath.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Routing
    m.add_class::<PyWeightedGraph>()?;
    m.add_function(wrap_pyfunction!(py_find_path, m)?)?;
    m.add_function(wrap_pyfunction!(py_find_route, m)?)?;

    // Dispatch
    m.add_class::<PyIndexedCounter>()?;
    m.add_class::<PyTaskDispatcher>()?;
    m.add_class::<PyKeyedDispatcher>()?;

    // Config types
    m.add_class::<SearchConfig>()?;
    m.add_class::<DispatchConfig>()?;

    Ok(())
}
