use super::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Unvisited,
    Open,
    Closed,
}

/// Per-node scratch data. Only meaningful while `generation` matches the
/// owning store's current generation.
#[derive(Debug, Clone)]
pub(crate) struct NodeSlot {
    pub(crate) generation: u32,
    pub(crate) cost_from_start: f32,
    pub(crate) estimate_to_goal: f32,
    pub(crate) total_cost: f32,
    pub(crate) parent: Option<NodeId>,
    // Cost of the edge parent -> this node.
    pub(crate) edge_cost: f32,
    pub(crate) state: NodeState,
    pub(crate) heap_index: usize,
    pub(crate) sequence: u64,
}

impl Default for NodeSlot {
    fn default() -> Self {
        NodeSlot {
            generation: 0,
            cost_from_start: 0.0,
            estimate_to_goal: 0.0,
            total_cost: 0.0,
            parent: None,
            edge_cost: 0.0,
            state: NodeState::Unvisited,
            heap_index: usize::MAX,
            sequence: 0,
        }
    }
}

impl NodeSlot {
    #[inline]
    pub(crate) fn calc_total_cost(&mut self) {
        self.total_cost = self.cost_from_start + self.estimate_to_goal;
    }
}

/// Arena of node scratch state, reset in O(1) per search by bumping the
/// generation.
#[derive(Debug, Default)]
pub(crate) struct NodeStore {
    slots: Vec<NodeSlot>,
    generation: u32,
}

impl NodeStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Start a fresh search over a graph of `node_count` nodes. Every slot
    /// touched by earlier searches becomes `Unvisited`.
    pub(crate) fn begin_search(&mut self, node_count: usize) -> u32 {
        if self.slots.len() < node_count {
            self.slots.resize(node_count, NodeSlot::default());
        }

        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            // Wrapped: old stamps could alias new generations.
            for slot in self.slots.iter_mut() {
                slot.generation = 0;
            }
            self.generation = 1;
        }
        self.generation
    }

    #[cfg(test)]
    pub(crate) fn is_touched(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index())
            .is_some_and(|slot| slot.generation == self.generation)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&NodeSlot> {
        self.slots
            .get(id.index())
            .filter(|slot| slot.generation == self.generation)
    }

    /// Slot of a node touched in the current search.
    #[inline]
    pub(crate) fn slot(&self, id: NodeId) -> &NodeSlot {
        let slot = &self.slots[id.index()];
        debug_assert_eq!(slot.generation, self.generation, "stale node {id:?}");
        slot
    }

    #[inline]
    pub(crate) fn slot_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        let generation = self.generation;
        let slot = &mut self.slots[id.index()];
        debug_assert_eq!(slot.generation, generation, "stale node {id:?}");
        slot
    }

    /// Stamp `id` into the current generation with fresh costs. `parent`
    /// carries the predecessor and the cost of the edge from it.
    pub(crate) fn init(
        &mut self,
        id: NodeId,
        cost_from_start: f32,
        estimate_to_goal: f32,
        parent: Option<(NodeId, f32)>,
    ) -> &mut NodeSlot {
        let generation = self.generation;
        let slot = &mut self.slots[id.index()];
        slot.generation = generation;
        slot.cost_from_start = cost_from_start;
        slot.estimate_to_goal = estimate_to_goal;
        slot.calc_total_cost();
        slot.parent = parent.map(|(node, _)| node);
        slot.edge_cost = parent.map_or(0.0, |(_, cost)| cost);
        slot.state = NodeState::Unvisited;
        slot.heap_index = usize::MAX;
        slot.sequence = 0;
        slot
    }

    #[inline]
    pub(crate) fn state(&self, id: NodeId) -> NodeState {
        self.get(id).map_or(NodeState::Unvisited, |slot| slot.state)
    }

    // ---- closed set ---- //

    pub(crate) fn close(&mut self, id: NodeId) {
        let slot = self.slot_mut(id);
        debug_assert_eq!(slot.state, NodeState::Open, "closing {id:?} outside the frontier");
        slot.state = NodeState::Closed;
    }

    #[cfg(test)]
    pub(crate) fn is_closed(&self, id: NodeId) -> bool {
        self.state(id) == NodeState::Closed
    }
}
