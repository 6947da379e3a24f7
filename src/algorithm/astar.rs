use super::{check_handle, construct_path, SearchSpace, Solution};
use crate::common::{NodeId, NodeState, StateCost};
use crate::graph::Graph;
use crate::stat::Stats;

use tracing::{debug, instrument, trace};

#[instrument(skip_all, name = "a_star", fields(start = start.index(), goal = goal.index()), level = "debug")]
pub(crate) fn a_star_search<G: Graph>(
    graph: &G,
    space: &mut SearchSpace,
    start: NodeId,
    goal: NodeId,
    stats: &mut Stats,
) -> Option<Solution> {
    let SearchSpace {
        nodes,
        frontier,
        adjacent,
    } = space;

    nodes.begin_search(graph.node_count());
    frontier.clear();

    let estimate = graph.least_cost_estimate(start, goal);
    if !estimate.is_finite() {
        debug!("goal ruled out by the estimate");
        return None;
    }
    nodes.init(start, 0.0, estimate, None);
    frontier.push(nodes, start);
    stats.frontier_pushes += 1;

    while let Some(current) = frontier.pop(nodes) {
        trace!("expand node: {current:?} total={}", nodes.slot(current).total_cost);
        stats.expanded_nodes += 1;

        if current == goal {
            let (path, edge_costs) = construct_path(nodes, goal);
            let cost = nodes.slot(goal).cost_from_start;
            debug!(
                "solved: {} steps, cost {cost}, {} nodes left open",
                edge_costs.len(),
                frontier.len()
            );
            return Some(Solution {
                path,
                edge_costs,
                cost,
            });
        }

        nodes.close(current);
        let current_cost = nodes.slot(current).cost_from_start;

        adjacent.clear();
        graph.adjacent_cost(current, adjacent);

        for &StateCost { state: child, cost } in adjacent.iter() {
            // Blocked edge.
            if !cost.is_finite() {
                continue;
            }
            check_handle(graph, child);
            debug_assert!(cost >= 0.0, "negative edge cost {cost} into {child:?}");

            let new_cost = current_cost + cost;
            match nodes.state(child) {
                NodeState::Unvisited => {
                    let estimate = graph.least_cost_estimate(child, goal);
                    // Cannot reach the goal, or the cost overflowed.
                    if !(new_cost + estimate).is_finite() {
                        continue;
                    }
                    nodes.init(child, new_cost, estimate, Some((current, cost)));
                    frontier.push(nodes, child);
                    stats.frontier_pushes += 1;
                }
                state => {
                    let slot = nodes.slot_mut(child);
                    if new_cost < slot.cost_from_start {
                        slot.parent = Some(current);
                        slot.edge_cost = cost;
                        slot.cost_from_start = new_cost;
                        slot.estimate_to_goal = graph.least_cost_estimate(child, goal);
                        slot.calc_total_cost();
                        // A closed node only improves under an inconsistent
                        // heuristic. It is updated in place, never reopened.
                        if state == NodeState::Open {
                            frontier.reprioritize(nodes, child);
                        }
                    }
                }
            }
        }
    }

    debug!("cannot find solution");
    None
}
