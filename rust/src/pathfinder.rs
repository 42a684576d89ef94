//! A* shortest-path search over a [`WeightedGraph`].
//!
//! The open set is a binary heap ordered by estimated total cost (`f`), with
//! ties broken by insertion order so results are deterministic. Superseded
//! heap entries are not removed; they are recognised at pop time because
//! their `g` is worse than the node's best known `g` and are skipped. A node
//! can therefore be expanded more than once, which keeps results optimal for
//! heuristics that are admissible but not consistent.
//!
//! Path costs use checked addition. A relaxation whose cost does not fit in
//! a [`Weight`] is dropped, so routes costing more than `Weight::MAX` are
//! reported as missing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use crate::config::SearchConfig;
use crate::error::KernelResult;
use crate::graph::{NodeId, Weight, WeightedGraph};
use crate::heuristic::{Heuristic, HeuristicKind};
use crate::{log_events, log_steps, log_trace};

/// A route found by the search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Route {
    /// Nodes from start to goal, inclusive.
    pub nodes: Vec<NodeId>,
    /// Sum of the edge weights along `nodes`.
    pub total_weight: Weight,
    /// Number of node expansions performed (stale pops excluded).
    pub expanded: usize,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, node) in self.nodes.iter().enumerate() {
            if i > 0 {
                write!(f, " -> ")?;
            }
            write!(f, "{}", node)?;
        }
        Ok(())
    }
}

/// Open-set entry. Ordered so that `BinaryHeap` pops the smallest `f`,
/// then the earliest inserted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenEntry {
    f: Weight,
    seq: u64,
    g: Weight,
    node: NodeId,
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .f
            .cmp(&self.f)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Per-search bookkeeping, dropped when the search returns.
struct SearchRecord {
    /// Best known cost from start; `None` until the node is reached.
    g_score: Vec<Option<Weight>>,
    f_score: Vec<Option<Weight>>,
    came_from: Vec<Option<NodeId>>,
    open: BinaryHeap<OpenEntry>,
    next_seq: u64,
}

impl SearchRecord {
    fn new(node_count: usize) -> Self {
        Self {
            g_score: vec![None; node_count],
            f_score: vec![None; node_count],
            came_from: vec![None; node_count],
            open: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    fn push(&mut self, node: NodeId, g: Weight, f: Weight) {
        self.g_score[node] = Some(g);
        self.f_score[node] = Some(f);
        self.open.push(OpenEntry {
            f,
            seq: self.next_seq,
            g,
            node,
        });
        self.next_seq += 1;
    }

    /// Follow predecessor links from `goal` back to the start.
    fn reconstruct(&self, goal: NodeId) -> Vec<NodeId> {
        let mut path = vec![goal];
        let mut at = goal;
        while let Some(prev) = self.came_from[at] {
            path.push(prev);
            at = prev;
        }
        path.reverse();
        path
    }
}

/// Find a route from `start` to `goal` and return its nodes.
///
/// Returns an empty vector when `goal` is unreachable. The route has minimum
/// total weight whenever `heuristic` is admissible.
///
/// # Errors
/// * `OutOfRange` if `start` or `goal` is not a node of `graph`
pub fn find_path<H: Heuristic + ?Sized>(
    graph: &WeightedGraph,
    start: NodeId,
    goal: NodeId,
    heuristic: &H,
) -> KernelResult<Vec<NodeId>> {
    Ok(find_route(graph, start, goal, heuristic)?
        .map(|route| route.nodes)
        .unwrap_or_default())
}

/// Like [`find_path`], but returns the route's weight and search statistics.
/// `None` means no path exists.
pub fn find_route<H: Heuristic + ?Sized>(
    graph: &WeightedGraph,
    start: NodeId,
    goal: NodeId,
    heuristic: &H,
) -> KernelResult<Option<Route>> {
    find_route_with_config(graph, start, goal, heuristic, &SearchConfig::default())
}

/// Run the search with an explicit configuration.
///
/// Only `config.verbosity` is consulted here; `config.heuristic` is the name
/// used by [`find_route_by_name`].
pub fn find_route_with_config<H: Heuristic + ?Sized>(
    graph: &WeightedGraph,
    start: NodeId,
    goal: NodeId,
    heuristic: &H,
    config: &SearchConfig,
) -> KernelResult<Option<Route>> {
    graph.check_node(start)?;
    graph.check_node(goal)?;
    let verbosity = config.verbosity;

    let mut record = SearchRecord::new(graph.node_count());
    record.push(start, 0, clamped_estimate(heuristic, start, goal));
    let mut expanded = 0usize;

    while let Some(entry) = record.open.pop() {
        let current = entry.node;
        if record.g_score[current].is_some_and(|best| entry.g > best) {
            log_trace!(
                verbosity,
                "  skip stale entry for {} (g={} > {:?})",
                current,
                entry.g,
                record.g_score[current]
            );
            continue;
        }

        if current == goal {
            let route = Route {
                nodes: record.reconstruct(goal),
                total_weight: entry.g,
                expanded,
            };
            log_events!(
                verbosity,
                "Route {} -> {}: {} (weight {}, {} expansions)",
                start,
                goal,
                route,
                route.total_weight,
                expanded
            );
            return Ok(Some(route));
        }

        expanded += 1;
        log_steps!(verbosity, "Expand {} (g={}, f={})", current, entry.g, entry.f);

        for &(neighbor, weight) in graph.adjacent(current) {
            let Some(tentative) = entry.g.checked_add(weight) else {
                log_trace!(
                    verbosity,
                    "  skip {} via {}: cost overflows ({} + {})",
                    neighbor,
                    current,
                    entry.g,
                    weight
                );
                continue;
            };
            let improves = match record.g_score[neighbor] {
                Some(best) => tentative < best,
                None => true,
            };
            if improves {
                // f only orders the open set; saturating keeps it a valid key
                let f = tentative.saturating_add(clamped_estimate(heuristic, neighbor, goal));
                log_trace!(
                    verbosity,
                    "  relax {} via {}: g {:?} -> {}, f {:?} -> {}",
                    neighbor,
                    current,
                    record.g_score[neighbor],
                    tentative,
                    record.f_score[neighbor],
                    f
                );
                record.came_from[neighbor] = Some(current);
                record.push(neighbor, tentative, f);
            }
        }
    }

    log_events!(
        verbosity,
        "No route {} -> {} ({} expansions)",
        start,
        goal,
        expanded
    );
    Ok(None)
}

/// Heuristic estimate with negative values treated as 0.
#[inline]
fn clamped_estimate<H: Heuristic + ?Sized>(heuristic: &H, node: NodeId, goal: NodeId) -> Weight {
    heuristic.estimate(node, goal).max(0)
}

/// Run the search with the heuristic named by `config.heuristic`.
///
/// `positions` supplies per-node coordinates for `"manhattan"`.
///
/// # Errors
/// * `UnknownHeuristic` for an unrecognised name
/// * `MissingCoordinates` if `"manhattan"` is used without one position per node
/// * `OutOfRange` if `start` or `goal` is not a node of `graph`
pub fn find_route_by_name(
    graph: &WeightedGraph,
    start: NodeId,
    goal: NodeId,
    config: &SearchConfig,
    positions: Option<Vec<(i64, i64)>>,
) -> KernelResult<Option<Route>> {
    let heuristic = HeuristicKind::resolve(&config.heuristic, graph, positions)?;
    find_route_with_config(graph, start, goal, &heuristic, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::heuristic::{IdDistance, Manhattan, ZeroHeuristic};
    use proptest::prelude::*;

    fn make_graph(n: usize, edges: &[(NodeId, NodeId, Weight)]) -> WeightedGraph {
        let mut graph = WeightedGraph::new(n);
        for &(u, v, w) in edges {
            graph.add_edge(u, v, w).unwrap();
        }
        graph
    }

    /// Distance marker for unreachable pairs in the brute-force table.
    const NO_PATH: Weight = Weight::MAX;

    fn facility_graph() -> WeightedGraph {
        make_graph(5, &[(0, 1, 1), (1, 2, 1), (0, 3, 2), (3, 4, 1), (2, 4, 3)])
    }

    /// All-pairs shortest distances by Floyd-Warshall.
    fn brute_force_distances(n: usize, edges: &[(NodeId, NodeId, Weight)]) -> Vec<Vec<Weight>> {
        let mut dist = vec![vec![NO_PATH; n]; n];
        for (i, row) in dist.iter_mut().enumerate() {
            row[i] = 0;
        }
        for &(u, v, w) in edges {
            dist[u][v] = dist[u][v].min(w);
            dist[v][u] = dist[v][u].min(w);
        }
        for k in 0..n {
            for i in 0..n {
                for j in 0..n {
                    let via = dist[i][k].saturating_add(dist[k][j]);
                    if via < dist[i][j] {
                        dist[i][j] = via;
                    }
                }
            }
        }
        dist
    }

    #[test]
    fn test_facility_route_is_minimal() {
        let graph = facility_graph();
        let path = find_path(&graph, 0, 4, &IdDistance).unwrap();
        assert_eq!(path, vec![0, 3, 4]);
        assert_eq!(graph.path_weight(&path), Some(3));

        let route = find_route(&graph, 0, 4, &ZeroHeuristic).unwrap().unwrap();
        assert_eq!(route.total_weight, 3);
        assert_eq!(route.nodes, vec![0, 3, 4]);
    }

    #[test]
    fn test_route_display() {
        let graph = facility_graph();
        let route = find_route(&graph, 0, 4, &IdDistance).unwrap().unwrap();
        assert_eq!(route.to_string(), "0 -> 3 -> 4");
    }

    #[test]
    fn test_start_equals_goal() {
        let graph = facility_graph();
        assert_eq!(find_path(&graph, 2, 2, &IdDistance).unwrap(), vec![2]);
        let route = find_route(&graph, 2, 2, &IdDistance).unwrap().unwrap();
        assert_eq!(route.total_weight, 0);
        assert_eq!(route.expanded, 0);
    }

    #[test]
    fn test_isolated_start_equals_goal() {
        let graph = WeightedGraph::new(1);
        assert_eq!(find_path(&graph, 0, 0, &ZeroHeuristic).unwrap(), vec![0]);
    }

    #[test]
    fn test_disconnected_returns_empty() {
        let graph = make_graph(4, &[(0, 1, 1), (2, 3, 1)]);
        assert!(find_path(&graph, 0, 3, &IdDistance).unwrap().is_empty());
        assert_eq!(find_route(&graph, 0, 3, &IdDistance).unwrap(), None);
    }

    #[test]
    fn test_out_of_range_endpoints() {
        let graph = facility_graph();
        assert_eq!(
            find_path(&graph, 5, 0, &IdDistance),
            Err(KernelError::OutOfRange { index: 5, bound: 5 })
        );
        assert_eq!(
            find_path(&graph, 0, 17, &IdDistance),
            Err(KernelError::OutOfRange {
                index: 17,
                bound: 5
            })
        );
    }

    #[test]
    fn test_parallel_edges_use_lightest() {
        let graph = make_graph(2, &[(0, 1, 9), (0, 1, 2)]);
        let route = find_route(&graph, 0, 1, &ZeroHeuristic).unwrap().unwrap();
        assert_eq!(route.total_weight, 2);
        assert_eq!(route.nodes, vec![0, 1]);
    }

    #[test]
    fn test_zero_weight_edges() {
        let graph = make_graph(3, &[(0, 1, 0), (1, 2, 0), (0, 2, 1)]);
        let route = find_route(&graph, 0, 2, &ZeroHeuristic).unwrap().unwrap();
        assert_eq!(route.total_weight, 0);
        assert_eq!(route.nodes, vec![0, 1, 2]);
    }

    #[test]
    fn test_inconsistent_heuristic_reopens_node() {
        // 0=S, 1=A, 2=B, 3=C, 4=G. h(B)=4 is admissible (true cost 4) but
        // inconsistent, so C is first reached through A with g=4 and later
        // improved through B to g=3.
        let graph = make_graph(5, &[(0, 1, 1), (1, 3, 3), (0, 2, 2), (2, 3, 1), (3, 4, 3)]);
        let h = |node: NodeId, _goal: NodeId| -> Weight {
            if node == 2 {
                4
            } else {
                0
            }
        };
        let route = find_route(&graph, 0, 4, &h).unwrap().unwrap();
        assert_eq!(route.nodes, vec![0, 2, 3, 4]);
        assert_eq!(route.total_weight, 6);
        // S, A, C (g=4), B, C (g=3)
        assert_eq!(route.expanded, 5);
    }

    #[test]
    fn test_max_weight_edge_is_routable() {
        let graph = make_graph(2, &[(0, 1, Weight::MAX)]);
        assert_eq!(find_path(&graph, 0, 1, &ZeroHeuristic).unwrap(), vec![0, 1]);
        let route = find_route(&graph, 0, 1, &IdDistance).unwrap().unwrap();
        assert_eq!(route.total_weight, Weight::MAX);
    }

    #[test]
    fn test_overflowing_route_is_skipped() {
        // 0 -> 1 -> 2 costs Weight::MAX + 1; the direct edge does not overflow
        let graph = make_graph(3, &[(0, 1, Weight::MAX), (1, 2, 1)]);
        assert!(find_path(&graph, 0, 2, &ZeroHeuristic).unwrap().is_empty());

        let mut detour = graph.clone();
        detour.add_edge(0, 2, Weight::MAX - 1).unwrap();
        let route = find_route(&detour, 0, 1, &ZeroHeuristic).unwrap().unwrap();
        assert_eq!(route.nodes, vec![0, 1]);
        let route = find_route(&detour, 0, 2, &ZeroHeuristic).unwrap().unwrap();
        assert_eq!(route.nodes, vec![0, 2]);
        assert_eq!(route.total_weight, Weight::MAX - 1);
    }

    #[test]
    fn test_negative_estimates_count_as_zero() {
        let graph = facility_graph();
        let h = |_node: NodeId, _goal: NodeId| -> Weight { -50 };
        let route = find_route(&graph, 0, 4, &h).unwrap().unwrap();
        assert_eq!(route.nodes, vec![0, 3, 4]);
        assert_eq!(route.total_weight, 3);

        let zero = find_route(&graph, 0, 4, &ZeroHeuristic).unwrap().unwrap();
        assert_eq!(route.expanded, zero.expanded);
    }

    #[test]
    fn test_equal_cost_ties_are_fifo() {
        let a = make_graph(4, &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1)]);
        assert_eq!(find_path(&a, 0, 3, &ZeroHeuristic).unwrap(), vec![0, 1, 3]);

        let b = make_graph(4, &[(0, 2, 1), (0, 1, 1), (1, 3, 1), (2, 3, 1)]);
        assert_eq!(find_path(&b, 0, 3, &ZeroHeuristic).unwrap(), vec![0, 2, 3]);
    }

    #[test]
    fn test_manhattan_on_grid() {
        // 2x3 grid, unit spacing, unit weights:
        // 0 1 2
        // 3 4 5
        let graph = make_graph(
            6,
            &[(0, 1, 1), (1, 2, 1), (3, 4, 1), (4, 5, 1), (0, 3, 1), (1, 4, 1), (2, 5, 1)],
        );
        let positions = vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)];
        let manhattan = Manhattan::for_graph(&graph, positions).unwrap();
        let route = find_route(&graph, 0, 5, &manhattan).unwrap().unwrap();
        assert_eq!(route.total_weight, 3);
        assert_eq!(route.nodes.first(), Some(&0));
        assert_eq!(route.nodes.last(), Some(&5));

        let dijkstra = find_route(&graph, 0, 5, &ZeroHeuristic).unwrap().unwrap();
        assert!(route.expanded <= dijkstra.expanded);
    }

    #[test]
    fn test_find_route_by_name() {
        let graph = facility_graph();
        let config = SearchConfig {
            heuristic: "zero".to_string(),
            verbosity: 0,
        };
        let route = find_route_by_name(&graph, 0, 4, &config, None)
            .unwrap()
            .unwrap();
        assert_eq!(route.total_weight, 3);

        let bad = SearchConfig {
            heuristic: "straight_line".to_string(),
            verbosity: 0,
        };
        assert_eq!(
            find_route_by_name(&graph, 0, 4, &bad, None),
            Err(KernelError::UnknownHeuristic("straight_line".to_string()))
        );
    }

    #[test]
    fn test_verbose_search_still_correct() {
        let graph = facility_graph();
        let config = SearchConfig {
            heuristic: "id_distance".to_string(),
            verbosity: 3,
        };
        let route = find_route_with_config(&graph, 0, 4, &IdDistance, &config)
            .unwrap()
            .unwrap();
        assert_eq!(route.total_weight, 3);
    }

    fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(NodeId, NodeId, Weight)>)> {
        (1usize..8).prop_flat_map(|n| {
            let edge = (0..n, 0..n, 0i64..20);
            (Just(n), prop::collection::vec(edge, 0..20))
        })
    }

    proptest! {
        #[test]
        fn prop_zero_heuristic_matches_brute_force(
            (n, edges) in graph_strategy(),
            start_seed in any::<usize>(),
            goal_seed in any::<usize>(),
        ) {
            let start = start_seed % n;
            let goal = goal_seed % n;
            let graph = make_graph(n, &edges);
            let dist = brute_force_distances(n, &edges);
            let path = find_path(&graph, start, goal, &ZeroHeuristic).unwrap();

            if dist[start][goal] == NO_PATH {
                prop_assert!(path.is_empty());
            } else {
                prop_assert_eq!(path.first(), Some(&start));
                prop_assert_eq!(path.last(), Some(&goal));
                prop_assert_eq!(graph.path_weight(&path), Some(dist[start][goal]));
            }
        }

        #[test]
        fn prop_exact_heuristic_matches_brute_force(
            (n, edges) in graph_strategy(),
            start_seed in any::<usize>(),
            goal_seed in any::<usize>(),
        ) {
            let start = start_seed % n;
            let goal = goal_seed % n;
            let graph = make_graph(n, &edges);
            let dist = brute_force_distances(n, &edges);
            // Half the true remaining distance: admissible, often inconsistent.
            let h = |node: NodeId, goal: NodeId| -> Weight {
                let d = dist[node][goal];
                if d == NO_PATH { 0 } else { d / 2 }
            };
            let route = find_route(&graph, start, goal, &h).unwrap();

            match route {
                None => prop_assert_eq!(dist[start][goal], NO_PATH),
                Some(route) => {
                    prop_assert_eq!(route.total_weight, dist[start][goal]);
                    prop_assert_eq!(graph.path_weight(&route.nodes), Some(route.total_weight));
                }
            }
        }
    }
}
