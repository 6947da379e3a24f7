use super::{check_handle, SearchSpace};
use crate::common::{NodeId, NodeState, StateCost};
use crate::graph::Graph;
use crate::stat::Stats;

use tracing::{debug, instrument, trace};

/// Single-source uniform-cost search, no heuristic. Returns every node whose
/// final cost is within `max_cost`, cheapest first.
#[instrument(skip_all, name = "dijkstra", fields(start = start.index(), max_cost = max_cost), level = "debug")]
pub(crate) fn dijkstra_search<G: Graph>(
    graph: &G,
    space: &mut SearchSpace,
    start: NodeId,
    max_cost: f32,
    stats: &mut Stats,
) -> Vec<StateCost> {
    // Nothing is within a NaN budget.
    if max_cost.is_nan() {
        debug!("no budget");
        return Vec::new();
    }

    let SearchSpace {
        nodes,
        frontier,
        adjacent,
    } = space;

    nodes.begin_search(graph.node_count());
    frontier.clear();

    let mut near = Vec::new();
    nodes.init(start, 0.0, 0.0, None);
    frontier.push(nodes, start);
    stats.frontier_pushes += 1;

    while let Some(current) = frontier.pop(nodes) {
        nodes.close(current);
        stats.expanded_nodes += 1;

        let current_cost = nodes.slot(current).cost_from_start;
        if current_cost > max_cost {
            // Too far away to ever get here.
            continue;
        }
        trace!("finalized {current:?} at {current_cost}");
        near.push(StateCost::new(current, current_cost));

        adjacent.clear();
        graph.adjacent_cost(current, adjacent);

        for &StateCost { state: child, cost } in adjacent.iter() {
            if !cost.is_finite() {
                continue;
            }
            check_handle(graph, child);

            let new_cost = current_cost + cost;
            if !new_cost.is_finite() || new_cost > max_cost {
                continue;
            }
            match nodes.state(child) {
                NodeState::Unvisited => {
                    nodes.init(child, new_cost, 0.0, Some((current, cost)));
                    frontier.push(nodes, child);
                    stats.frontier_pushes += 1;
                }
                NodeState::Open => {
                    let slot = nodes.slot_mut(child);
                    if new_cost < slot.cost_from_start {
                        slot.parent = Some(current);
                        slot.edge_cost = cost;
                        slot.cost_from_start = new_cost;
                        slot.calc_total_cost();
                        frontier.reprioritize(nodes, child);
                    }
                }
                NodeState::Closed => {}
            }
        }
    }

    debug!("{} nodes within {max_cost}", near.len());
    near
}
