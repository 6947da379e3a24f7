use std::hash::BuildHasher;
use std::mem;

use ahash::RandomState;
use serde::Serialize;
use tracing::{debug, trace};

use crate::common::{NodeId, Path};

/// One hop of a cached route: from `origin`, heading for `goal`, step to
/// `next` at `cost`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CacheEntry {
    pub(crate) origin: NodeId,
    pub(crate) goal: NodeId,
    pub(crate) next: NodeId,
    pub(crate) cost: f32,
}

/// Cache health figures, for sizing the cache against the map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheData {
    pub bytes_allocated: usize,
    pub bytes_used: usize,
    pub memory_fraction: f32,
    pub hits: usize,
    pub misses: usize,
    pub hit_fraction: f32,
}

/// Fixed-capacity, open-addressed table of route hops keyed by
/// `(origin, goal)`.
///
/// Entries are never evicted: once a route would push occupancy past two
/// thirds of the capacity it is not stored, and the solver falls back to
/// searching. A capacity of zero disables caching.
#[derive(Debug)]
pub struct PathCache {
    slots: Vec<Option<CacheEntry>>,
    len: usize,
    hasher: RandomState,
    hits: usize,
    misses: usize,
}

impl PathCache {
    pub fn new(capacity: usize) -> Self {
        PathCache {
            slots: vec![None; capacity],
            len: 0,
            // Fixed seeds keep the probe layout reproducible between runs.
            hasher: RandomState::with_seeds(
                0x243f_6a88_85a3_08d3,
                0x1319_8a2e_0370_7344,
                0xa409_3822_299f_31d0,
                0x082e_fa98_ec4e_6c89,
            ),
            hits: 0,
            misses: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn limit(&self) -> usize {
        self.slots.len() * 2 / 3
    }

    /// Drop every entry. Hit and miss counters are kept.
    pub fn reset(&mut self) {
        if self.len > 0 {
            self.slots.fill(None);
            self.len = 0;
        }
    }

    /// Record every hop of a solved `path`. `edge_costs[i]` is the cost of
    /// `path[i] -> path[i + 1]`. Returns `false` if the route was refused for
    /// lack of room.
    pub fn add(&mut self, path: &[NodeId], edge_costs: &[f32], symmetric: bool) -> bool {
        assert_eq!(edge_costs.len() + 1, path.len(), "one cost per hop");
        if path.len() < 2 {
            return false;
        }

        let hops = path.len() - 1;
        let needed = if symmetric { hops * 2 } else { hops };
        if self.len + needed > self.limit() {
            debug!(
                "path cache full ({}/{}), not storing {} entries",
                self.len,
                self.capacity(),
                needed
            );
            return false;
        }

        let start = path[0];
        let goal = path[hops];
        for (i, &cost) in edge_costs.iter().enumerate() {
            self.insert(CacheEntry {
                origin: path[i],
                goal,
                next: path[i + 1],
                cost,
            });
        }
        if symmetric {
            for (i, &cost) in edge_costs.iter().enumerate().rev() {
                self.insert(CacheEntry {
                    origin: path[i + 1],
                    goal: start,
                    next: path[i],
                    cost,
                });
            }
        }
        trace!("path cache holds {} entries", self.len);
        true
    }

    fn home_slot(&self, origin: NodeId, goal: NodeId) -> usize {
        (BuildHasher::hash_one(&self.hasher, (origin, goal)) % self.slots.len() as u64) as usize
    }

    fn insert(&mut self, entry: CacheEntry) {
        let mut index = self.home_slot(entry.origin, entry.goal);
        loop {
            let slot = &mut self.slots[index];
            match slot {
                // First route stored for a key wins.
                Some(existing) if existing.origin == entry.origin && existing.goal == entry.goal => {
                    return;
                }
                Some(_) => {}
                None => {
                    *slot = Some(entry);
                    self.len += 1;
                    return;
                }
            }
            index += 1;
            if index == self.slots.len() {
                index = 0;
            }
        }
    }

    pub(crate) fn find(&self, origin: NodeId, goal: NodeId) -> Option<CacheEntry> {
        if self.slots.is_empty() {
            return None;
        }
        let mut index = self.home_slot(origin, goal);
        for _ in 0..self.slots.len() {
            match self.slots[index] {
                None => return None,
                Some(entry) if entry.origin == origin && entry.goal == goal => return Some(entry),
                Some(_) => {}
            }
            index += 1;
            if index == self.slots.len() {
                index = 0;
            }
        }
        None
    }

    /// Follow cached hops from `start` to `goal`. Counts a hit or a miss.
    pub fn solve(&mut self, start: NodeId, goal: NodeId) -> Option<(Path, f32)> {
        let route = self.walk(start, goal);
        match route {
            Some(_) => self.hits += 1,
            None => self.misses += 1,
        }
        route
    }

    fn walk(&self, start: NodeId, goal: NodeId) -> Option<(Path, f32)> {
        let mut entry = self.find(start, goal)?;
        let mut path = vec![start];
        let mut cost = 0.0;
        loop {
            cost += entry.cost;
            path.push(entry.next);
            if entry.next == goal {
                return Some((path, cost));
            }
            // A chain longer than the table is a cycle.
            if path.len() > self.len + 1 {
                debug!("path cache chain {start:?} -> {goal:?} does not terminate");
                return None;
            }
            entry = self.find(entry.next, goal)?;
        }
    }

    pub fn data(&self) -> CacheData {
        let entry_size = mem::size_of::<Option<CacheEntry>>();
        let lookups = self.hits + self.misses;
        CacheData {
            bytes_allocated: self.slots.len() * entry_size,
            bytes_used: self.len * entry_size,
            memory_fraction: if self.slots.is_empty() {
                0.0
            } else {
                self.len as f32 / self.slots.len() as f32
            },
            hits: self.hits,
            misses: self.misses,
            hit_fraction: if lookups == 0 {
                0.0
            } else {
                self.hits as f32 / lookups as f32
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[usize]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    #[test]
    fn test_add_then_solve_every_suffix() {
        let mut cache = PathCache::new(64);
        let path = ids(&[0, 1, 2, 3]);
        assert!(cache.add(&path, &[1.0, 2.0, 0.5], false));
        assert_eq!(cache.len(), 3);

        assert_eq!(cache.solve(NodeId(0), NodeId(3)), Some((path.clone(), 3.5)));
        assert_eq!(cache.solve(NodeId(1), NodeId(3)), Some((ids(&[1, 2, 3]), 2.5)));
        assert_eq!(cache.solve(NodeId(2), NodeId(3)), Some((ids(&[2, 3]), 0.5)));
        // Not symmetric: no reverse route, and no route to an inner node.
        assert_eq!(cache.solve(NodeId(3), NodeId(0)), None);
        assert_eq!(cache.solve(NodeId(0), NodeId(2)), None);

        let data = cache.data();
        assert_eq!(data.hits, 3);
        assert_eq!(data.misses, 2);
        assert!((data.hit_fraction - 0.6).abs() < 1e-6);
    }

    #[test]
    fn test_symmetric_add_stores_reverse_route() {
        let mut cache = PathCache::new(64);
        assert!(cache.add(&ids(&[4, 5, 6]), &[1.0, 3.0], true));
        assert_eq!(cache.len(), 4);
        assert_eq!(cache.solve(NodeId(6), NodeId(4)), Some((ids(&[6, 5, 4]), 4.0)));
        assert_eq!(cache.solve(NodeId(5), NodeId(4)), Some((ids(&[5, 4]), 1.0)));
    }

    #[test]
    fn test_refuses_past_two_thirds() {
        // Limit is 6 entries.
        let mut cache = PathCache::new(9);
        assert!(cache.add(&ids(&[0, 1, 2, 3]), &[1.0; 3], true));
        assert_eq!(cache.len(), 6);
        assert!(!cache.add(&ids(&[7, 8]), &[1.0], false));
        assert_eq!(cache.len(), 6);
        assert_eq!(cache.solve(NodeId(7), NodeId(8)), None);
        assert!(cache.data().memory_fraction > 0.66);
    }

    #[test]
    fn test_readding_a_key_keeps_first_hop() {
        let mut cache = PathCache::new(64);
        cache.add(&ids(&[0, 1, 3]), &[2.0, 2.0], false);
        cache.add(&ids(&[0, 2, 3]), &[1.0, 1.0], false);
        // (0, 3) is already stored; only (2, 3) is new.
        assert_eq!(cache.len(), 3);
        assert_eq!(cache.solve(NodeId(0), NodeId(3)), Some((ids(&[0, 1, 3]), 4.0)));
        assert_eq!(cache.solve(NodeId(2), NodeId(3)), Some((ids(&[2, 3]), 1.0)));
    }

    #[test]
    fn test_reset_drops_entries_keeps_counters() {
        let mut cache = PathCache::new(16);
        cache.add(&ids(&[0, 1]), &[1.0], false);
        assert!(cache.solve(NodeId(0), NodeId(1)).is_some());
        cache.reset();
        assert!(cache.is_empty());
        assert_eq!(cache.solve(NodeId(0), NodeId(1)), None);
        let data = cache.data();
        assert_eq!((data.hits, data.misses), (1, 1));
        assert_eq!(data.bytes_used, 0);
    }

    #[test]
    fn test_zero_capacity_disables_cache() {
        let mut cache = PathCache::new(0);
        assert!(!cache.add(&ids(&[0, 1]), &[1.0], true));
        assert_eq!(cache.solve(NodeId(0), NodeId(1)), None);
        let data = cache.data();
        assert_eq!(data.bytes_allocated, 0);
        assert_eq!(data.memory_fraction, 0.0);
    }
}
