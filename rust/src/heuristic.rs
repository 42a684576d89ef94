//! Remaining-cost estimators for A* search.
//!
//! A search only returns minimum-weight routes when its heuristic is
//! admissible: it must never exceed the true remaining cost.

use crate::error::{KernelError, KernelResult};
use crate::graph::{NodeId, Weight, WeightedGraph};

/// Estimate of the remaining cost from `node` to `goal`.
pub trait Heuristic {
    /// Must be pure. Negative estimates are treated as 0 by the search.
    fn estimate(&self, node: NodeId, goal: NodeId) -> Weight;
}

impl<F> Heuristic for F
where
    F: Fn(NodeId, NodeId) -> Weight,
{
    #[inline]
    fn estimate(&self, node: NodeId, goal: NodeId) -> Weight {
        self(node, goal)
    }
}

/// Absolute difference of node identifiers.
///
/// A placeholder: identifiers carry no spatial meaning, so this is not
/// admissible in general. Callers that need guaranteed-minimum routes should
/// supply [`ZeroHeuristic`], [`Manhattan`], or their own estimator.
#[derive(Clone, Copy, Debug, Default)]
pub struct IdDistance;

impl Heuristic for IdDistance {
    #[inline]
    fn estimate(&self, node: NodeId, goal: NodeId) -> Weight {
        Weight::try_from(node.abs_diff(goal)).unwrap_or(Weight::MAX)
    }
}

/// Always 0. Admissible for every graph; the search degrades to Dijkstra.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroHeuristic;

impl Heuristic for ZeroHeuristic {
    #[inline]
    fn estimate(&self, _node: NodeId, _goal: NodeId) -> Weight {
        0
    }
}

/// Manhattan distance between per-node `(x, y)` positions.
///
/// Admissible when every edge weighs at least the Manhattan distance between
/// its endpoints.
#[derive(Clone, Debug)]
pub struct Manhattan {
    positions: Vec<(i64, i64)>,
}

impl Manhattan {
    /// Build from one position per node of `graph`.
    pub fn for_graph(graph: &WeightedGraph, positions: Vec<(i64, i64)>) -> KernelResult<Self> {
        if positions.len() != graph.node_count() {
            return Err(KernelError::MissingCoordinates {
                expected: graph.node_count(),
                found: positions.len(),
            });
        }
        Ok(Self { positions })
    }
}

impl Heuristic for Manhattan {
    fn estimate(&self, node: NodeId, goal: NodeId) -> Weight {
        let (ax, ay) = self.positions[node];
        let (bx, by) = self.positions[goal];
        let dist = ax.abs_diff(bx).saturating_add(ay.abs_diff(by));
        Weight::try_from(dist).unwrap_or(Weight::MAX)
    }
}

/// Heuristic selected by name at runtime (Python bindings, configs).
#[derive(Clone, Debug)]
pub enum HeuristicKind {
    IdDistance,
    Zero,
    Manhattan(Manhattan),
}

impl HeuristicKind {
    /// Resolve a heuristic name. `"manhattan"` needs `positions`.
    pub fn resolve(
        name: &str,
        graph: &WeightedGraph,
        positions: Option<Vec<(i64, i64)>>,
    ) -> KernelResult<Self> {
        match name {
            "id_distance" => Ok(Self::IdDistance),
            "zero" => Ok(Self::Zero),
            "manhattan" => {
                let positions = positions.unwrap_or_default();
                Ok(Self::Manhattan(Manhattan::for_graph(graph, positions)?))
            }
            other => Err(KernelError::UnknownHeuristic(other.to_string())),
        }
    }
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, node: NodeId, goal: NodeId) -> Weight {
        match self {
            Self::IdDistance => IdDistance.estimate(node, goal),
            Self::Zero => ZeroHeuristic.estimate(node, goal),
            Self::Manhattan(m) => m.estimate(node, goal),
        }
    }
}
