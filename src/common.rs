mod frontier;
mod node;

pub(crate) use frontier::Frontier;
pub(crate) use node::{NodeState, NodeStore};

use serde::{Deserialize, Serialize};

/// Edge cost a graph reports for "no traversal possible".
pub const IMPASSABLE: f32 = f32::INFINITY;

/// Stable handle of a node in a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for NodeId {
    fn from(index: usize) -> Self {
        NodeId(index)
    }
}

/// A neighbour and the cost of reaching it, or a node and its cost from the
/// start for near-state queries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateCost {
    pub state: NodeId,
    pub cost: f32,
}

impl StateCost {
    pub fn new(state: NodeId, cost: f32) -> Self {
        StateCost { state, cost }
    }
}

pub type Path = Vec<NodeId>;

/// Outcome of a point-to-point query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SearchResult {
    Solved { path: Path, cost: f32 },
    StartEqualsGoal,
    NoSolution,
}

impl SearchResult {
    pub fn is_solved(&self) -> bool {
        matches!(self, SearchResult::Solved { .. })
    }

    /// The solved path, if any. `StartEqualsGoal` has no stored path since the
    /// caller already holds the single node.
    pub fn path(&self) -> Option<&[NodeId]> {
        match self {
            SearchResult::Solved { path, .. } => Some(path),
            _ => None,
        }
    }

    /// Total cost; zero for `StartEqualsGoal`, `None` when unreachable.
    pub fn cost(&self) -> Option<f32> {
        match self {
            SearchResult::Solved { cost, .. } => Some(*cost),
            SearchResult::StartEqualsGoal => Some(0.0),
            SearchResult::NoSolution => None,
        }
    }
}
