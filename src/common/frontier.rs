use super::node::{NodeSlot, NodeState, NodeStore};
use super::NodeId;

/// Open set: an indexed binary min-heap keyed by `(total_cost, sequence)`.
///
/// `sequence` is the insertion order within the current search, so nodes with
/// equal `total_cost` pop first-in first-out. Every queued node records its
/// heap position in its [`NodeSlot`], which lets `reprioritize` move it
/// without a scan.
#[derive(Debug, Default)]
pub(crate) struct Frontier {
    heap: Vec<NodeId>,
    next_sequence: u64,
}

#[inline]
fn precedes(lhs: &NodeSlot, rhs: &NodeSlot) -> bool {
    lhs.total_cost < rhs.total_cost
        || (lhs.total_cost == rhs.total_cost && lhs.sequence < rhs.sequence)
}

impl Frontier {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Forget everything queued by a previous search.
    pub(crate) fn clear(&mut self) {
        self.heap.clear();
        self.next_sequence = 0;
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn push(&mut self, nodes: &mut NodeStore, id: NodeId) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;

        let slot = nodes.slot_mut(id);
        assert_eq!(slot.state, NodeState::Unvisited, "{id:?} is already queued or closed");
        assert!(slot.total_cost < f32::INFINITY, "{id:?} pushed with infinite cost");
        slot.state = NodeState::Open;
        slot.sequence = sequence;

        let index = self.heap.len();
        self.heap.push(id);
        slot.heap_index = index;
        self.sift_up(nodes, index);
    }

    /// Remove the cheapest node. It stays `Open` until the caller closes it.
    pub(crate) fn pop(&mut self, nodes: &mut NodeStore) -> Option<NodeId> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap.swap_remove(0);
        nodes.slot_mut(top).heap_index = usize::MAX;
        if !self.heap.is_empty() {
            let moved = self.heap[0];
            nodes.slot_mut(moved).heap_index = 0;
            self.sift_down(nodes, 0);
        }
        Some(top)
    }

    /// Restore heap order after the `total_cost` of a queued node changed.
    pub(crate) fn reprioritize(&mut self, nodes: &mut NodeStore, id: NodeId) {
        let slot = nodes.slot(id);
        assert_eq!(slot.state, NodeState::Open, "{id:?} is not in the frontier");
        let index = slot.heap_index;
        debug_assert_eq!(self.heap[index], id);

        let index = self.sift_up(nodes, index);
        self.sift_down(nodes, index);
    }

    fn sift_up(&mut self, nodes: &mut NodeStore, mut index: usize) -> usize {
        let node = self.heap[index];
        while index > 0 {
            let parent_index = (index - 1) / 2;
            let parent = self.heap[parent_index];
            if !precedes(nodes.slot(node), nodes.slot(parent)) {
                break;
            }
            self.heap[index] = parent;
            nodes.slot_mut(parent).heap_index = index;
            index = parent_index;
        }
        self.heap[index] = node;
        nodes.slot_mut(node).heap_index = index;
        index
    }

    fn sift_down(&mut self, nodes: &mut NodeStore, mut index: usize) {
        let node = self.heap[index];
        loop {
            let left = index * 2 + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;
            let child_index = if right < self.heap.len()
                && precedes(nodes.slot(self.heap[right]), nodes.slot(self.heap[left]))
            {
                right
            } else {
                left
            };
            let child = self.heap[child_index];
            if !precedes(nodes.slot(child), nodes.slot(node)) {
                break;
            }
            self.heap[index] = child;
            nodes.slot_mut(child).heap_index = index;
            index = child_index;
        }
        self.heap[index] = node;
        nodes.slot_mut(node).heap_index = index;
    }
}
