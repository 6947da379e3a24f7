use crate::common::{NodeId, StateCost};

/// The searchable space supplied by the caller.
///
/// Node handles are dense indices below [`Graph::node_count`]; the solver
/// attaches its scratch state to them but never creates or destroys nodes.
pub trait Graph {
    /// Size of the handle space. Every `NodeId` handed to or returned by the
    /// graph must be below this.
    fn node_count(&self) -> usize;

    /// Estimate of the cost from `from` to `to`. Must never overestimate the
    /// true cost (admissible); searches are optimal only if it is also
    /// consistent. Neither property is checked.
    fn least_cost_estimate(&self, from: NodeId, to: NodeId) -> f32;

    /// Append the outgoing edges of `node` to `adjacent`, which the caller
    /// clears first. An edge reported with [`IMPASSABLE`](crate::IMPASSABLE)
    /// cost is skipped.
    fn adjacent_cost(&self, node: NodeId, adjacent: &mut Vec<StateCost>);

    /// Whether every edge costs the same in both directions. Lets the path
    /// cache record reversed routes too.
    fn is_symmetric(&self) -> bool {
        false
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::Graph;
    use crate::common::{NodeId, StateCost};

    type Estimate = Box<dyn Fn(NodeId, NodeId) -> f32>;

    /// Explicit adjacency lists, for hand-built and randomized test graphs.
    pub(crate) struct AdjacencyGraph {
        pub(crate) edges: Vec<Vec<StateCost>>,
        symmetric: bool,
        estimate: Estimate,
    }

    impl AdjacencyGraph {
        /// `symmetric` graphs get every edge in both directions.
        pub(crate) fn new(node_count: usize, symmetric: bool) -> Self {
            AdjacencyGraph {
                edges: vec![Vec::new(); node_count],
                symmetric,
                estimate: Box::new(|_, _| 0.0),
            }
        }

        pub(crate) fn edge(mut self, from: usize, to: usize, cost: f32) -> Self {
            self.edges[from].push(StateCost::new(NodeId(to), cost));
            if self.symmetric {
                self.edges[to].push(StateCost::new(NodeId(from), cost));
            }
            self
        }

        pub(crate) fn with_estimate(
            mut self,
            estimate: impl Fn(NodeId, NodeId) -> f32 + 'static,
        ) -> Self {
            self.estimate = Box::new(estimate);
            self
        }
    }

    impl Graph for AdjacencyGraph {
        fn node_count(&self) -> usize {
            self.edges.len()
        }

        fn least_cost_estimate(&self, from: NodeId, to: NodeId) -> f32 {
            (self.estimate)(from, to)
        }

        fn adjacent_cost(&self, node: NodeId, adjacent: &mut Vec<StateCost>) {
            adjacent.extend_from_slice(&self.edges[node.index()]);
        }

        fn is_symmetric(&self) -> bool {
            self.symmetric
        }
    }
}
