//! Undirected weighted graph over dense node identifiers.

use crate::error::{checked_size, KernelError, KernelResult};

/// Dense node identifier in `[0, node_count)`.
pub type NodeId = usize;

/// Edge weight. Always non-negative once stored.
pub type Weight = i64;

/// Append-only undirected multigraph stored as adjacency lists.
///
/// Every edge `(u, v, w)` is recorded in both `u`'s and `v`'s list, in the
/// order edges were added.
#[derive(Clone, Debug, Default)]
pub struct WeightedGraph {
    adjacency: Vec<Vec<(NodeId, Weight)>>,
    edge_count: usize,
}

impl WeightedGraph {
    /// Create a graph with `node_count` isolated nodes.
    pub fn new(node_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); node_count],
            edge_count: 0,
        }
    }

    /// Create a graph from a signed node count.
    pub fn checked_new(node_count: i64) -> KernelResult<Self> {
        Ok(Self::new(checked_size(node_count)?))
    }

    /// Add an undirected edge. Parallel edges are kept.
    pub fn add_edge(&mut self, u: NodeId, v: NodeId, weight: Weight) -> KernelResult<()> {
        self.check_node(u)?;
        self.check_node(v)?;
        if weight < 0 {
            return Err(KernelError::InvalidWeight(weight));
        }
        self.adjacency[u].push((v, weight));
        self.adjacency[v].push((u, weight));
        self.edge_count += 1;
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of `add_edge` calls that succeeded.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn contains(&self, node: NodeId) -> bool {
        node < self.adjacency.len()
    }

    /// Neighbors of `node` as `(neighbor, weight)` pairs in insertion order.
    pub fn neighbors(&self, node: NodeId) -> KernelResult<&[(NodeId, Weight)]> {
        self.check_node(node)?;
        Ok(&self.adjacency[node])
    }

    /// Unchecked neighbor access for callers that already validated `node`.
    #[inline]
    pub(crate) fn adjacent(&self, node: NodeId) -> &[(NodeId, Weight)] {
        &self.adjacency[node]
    }

    /// Weight of the lightest edge between `u` and `v`, if any.
    pub fn edge_weight(&self, u: NodeId, v: NodeId) -> Option<Weight> {
        self.adjacency
            .get(u)?
            .iter()
            .filter(|&&(n, _)| n == v)
            .map(|&(_, w)| w)
            .min()
    }

    /// Total weight of a node sequence, taking the lightest parallel edge per
    /// hop. `None` if two consecutive nodes are not adjacent or the total
    /// does not fit in a `Weight`.
    ///
    /// An empty or single-node path weighs 0.
    pub fn path_weight(&self, path: &[NodeId]) -> Option<Weight> {
        path.windows(2).try_fold(0, |total: Weight, hop| {
            total.checked_add(self.edge_weight(hop[0], hop[1])?)
        })
    }

    pub(crate) fn check_node(&self, node: NodeId) -> KernelResult<()> {
        if self.contains(node) {
            Ok(())
        } else {
            Err(KernelError::out_of_range(node, self.node_count()))
        }
    }
}
