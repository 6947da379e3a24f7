mod astar;
mod dijkstra;

pub(crate) use astar::a_star_search;
pub(crate) use dijkstra::dijkstra_search;

use crate::common::{Frontier, NodeId, NodeStore, Path, StateCost};
use crate::graph::Graph;

/// Scratch storage reused by every search of one solver.
#[derive(Debug, Default)]
pub(crate) struct SearchSpace {
    pub(crate) nodes: NodeStore,
    pub(crate) frontier: Frontier,
    pub(crate) adjacent: Vec<StateCost>,
}

impl SearchSpace {
    pub(crate) fn new() -> Self {
        SearchSpace {
            nodes: NodeStore::new(),
            frontier: Frontier::new(),
            adjacent: Vec::with_capacity(8),
        }
    }
}

/// A route found by searching. `edge_costs[i]` is the cost of
/// `path[i] -> path[i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Solution {
    pub(crate) path: Path,
    pub(crate) edge_costs: Vec<f32>,
    pub(crate) cost: f32,
}

#[inline]
pub(crate) fn check_handle<G: Graph>(graph: &G, node: NodeId) {
    assert!(
        node.index() < graph.node_count(),
        "{node:?} is outside a graph of {} nodes",
        graph.node_count()
    );
}

fn construct_path(nodes: &NodeStore, goal: NodeId) -> (Path, Vec<f32>) {
    let mut path = vec![goal];
    let mut edge_costs = Vec::new();
    let mut current = nodes.slot(goal);
    while let Some(parent) = current.parent {
        edge_costs.push(current.edge_cost);
        path.push(parent);
        current = nodes.slot(parent);
    }
    path.reverse();
    edge_costs.reverse();
    (path, edge_costs)
}
