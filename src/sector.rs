use std::fs;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::common::{NodeId, StateCost};
use crate::graph::Graph;

/// Port bits of a sector: which of its four sides can be crossed.
pub const NEG_X: u8 = 1 << 0;
pub const POS_X: u8 = 1 << 1;
pub const NEG_Y: u8 = 1 << 2;
pub const POS_Y: u8 = 1 << 3;
pub const ALL_PORTS: u8 = NEG_X | POS_X | NEG_Y | POS_Y;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    /// Runs along x: the `NEG_Y` side of sector `(x, y)`.
    Horizontal,
    /// Runs along y: the `NEG_X` side of sector `(x, y)`.
    Vertical,
}

/// A side shared by up to two sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridEdge {
    pub alignment: Alignment,
    pub x: usize,
    pub y: usize,
}

impl GridEdge {
    pub fn horizontal(x: usize, y: usize) -> Self {
        GridEdge {
            alignment: Alignment::Horizontal,
            x,
            y,
        }
    }

    pub fn vertical(x: usize, y: usize) -> Self {
        GridEdge {
            alignment: Alignment::Vertical,
            x,
            y,
        }
    }

    /// Midpoint, in sector units.
    pub fn center(&self) -> (f32, f32) {
        match self.alignment {
            Alignment::Horizontal => (self.x as f32 + 0.5, self.y as f32),
            Alignment::Vertical => (self.x as f32, self.y as f32 + 0.5),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SectorLayout {
    /// One row per `y`, one bitmask per `x`.
    ports: Vec<Vec<u8>>,
}

/// Coarse travel graph over an `n x n` square of sectors.
///
/// The nodes are the sector sides, walkable wherever every sector touching
/// the side has a port on it. Crossing a sector from one of its walkable sides
/// to another costs 1.
#[derive(Debug, Clone)]
pub struct SectorMap {
    size: usize,
    ports: Vec<u8>,
}

impl SectorMap {
    /// A map with every port closed.
    pub fn new(size: usize) -> Self {
        SectorMap {
            size,
            ports: vec![0; size * size],
        }
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read sectors {path}"))?;
        Self::from_yaml_str(&contents).with_context(|| format!("invalid sectors {path}"))
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let layout: SectorLayout = serde_yaml::from_str(yaml)?;
        let size = layout.ports.len();
        let mut map = SectorMap::new(size);
        for (y, row) in layout.ports.iter().enumerate() {
            if row.len() != size {
                bail!("sector row {y} has {} entries, expected {size}", row.len());
            }
            for (x, &ports) in row.iter().enumerate() {
                if ports & !ALL_PORTS != 0 {
                    bail!("sector ({x}, {y}) has unknown port bits {ports:#x}");
                }
                map.set_ports(x, y, ports);
            }
        }
        Ok(map)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn ports(&self, x: usize, y: usize) -> u8 {
        self.ports[y * self.size + x]
    }

    /// Change the ports of one sector. Cached routes are stale afterwards.
    pub fn set_ports(&mut self, x: usize, y: usize, ports: u8) {
        self.ports[y * self.size + x] = ports;
    }

    fn vertical_count(&self) -> usize {
        (self.size + 1) * self.size
    }

    fn in_range(&self, edge: GridEdge) -> bool {
        match edge.alignment {
            Alignment::Horizontal => edge.x < self.size && edge.y <= self.size,
            Alignment::Vertical => edge.x <= self.size && edge.y < self.size,
        }
    }

    pub fn has_edge(&self, edge: GridEdge) -> bool {
        if !self.in_range(edge) {
            return false;
        }
        let GridEdge { x, y, .. } = edge;
        let n = self.size;
        match edge.alignment {
            Alignment::Horizontal => {
                (y == 0 || self.ports(x, y - 1) & POS_Y != 0)
                    && (y == n || self.ports(x, y) & NEG_Y != 0)
            }
            Alignment::Vertical => {
                (x == 0 || self.ports(x - 1, y) & POS_X != 0)
                    && (x == n || self.ports(x, y) & NEG_X != 0)
            }
        }
    }

    /// Handle of a walkable side.
    pub fn edge_id(&self, edge: GridEdge) -> Option<NodeId> {
        if !self.has_edge(edge) {
            return None;
        }
        let index = match edge.alignment {
            Alignment::Vertical => edge.y * (self.size + 1) + edge.x,
            Alignment::Horizontal => self.vertical_count() + edge.y * self.size + edge.x,
        };
        Some(NodeId(index))
    }

    pub fn grid_edge(&self, node: NodeId) -> GridEdge {
        let index = node.index();
        let vertical = self.vertical_count();
        if index < vertical {
            GridEdge::vertical(index % (self.size + 1), index / (self.size + 1))
        } else {
            let index = index - vertical;
            GridEdge::horizontal(index % self.size, index / self.size)
        }
    }

    /// The four sides of sector `(x, y)`.
    fn sides(x: usize, y: usize) -> [GridEdge; 4] {
        [
            GridEdge::vertical(x, y),
            GridEdge::vertical(x + 1, y),
            GridEdge::horizontal(x, y),
            GridEdge::horizontal(x, y + 1),
        ]
    }

    /// Walkable sides of sector `(x, y)`; where travel into the sector can
    /// start from.
    pub fn sector_edges(&self, x: usize, y: usize) -> Vec<NodeId> {
        Self::sides(x, y)
            .into_iter()
            .filter_map(|edge| self.edge_id(edge))
            .collect()
    }

    /// Sectors on either side of `edge` that lie inside the map.
    fn bordering_sectors(&self, edge: GridEdge) -> impl Iterator<Item = (usize, usize)> {
        let GridEdge { x, y, .. } = edge;
        let before = match edge.alignment {
            Alignment::Horizontal => y.checked_sub(1).map(|y| (x, y)),
            Alignment::Vertical => x.checked_sub(1).map(|x| (x, y)),
        };
        let n = self.size;
        let after = (x < n && y < n).then_some((x, y));
        before.into_iter().chain(after)
    }
}

impl Graph for SectorMap {
    fn node_count(&self) -> usize {
        2 * self.size * (self.size + 1)
    }

    fn least_cost_estimate(&self, from: NodeId, to: NodeId) -> f32 {
        let (ax, ay) = self.grid_edge(from).center();
        let (bx, by) = self.grid_edge(to).center();
        (ax - bx).abs() + (ay - by).abs()
    }

    fn adjacent_cost(&self, node: NodeId, adjacent: &mut Vec<StateCost>) {
        let edge = self.grid_edge(node);
        if !self.has_edge(edge) {
            return;
        }
        for (x, y) in self.bordering_sectors(edge) {
            for side in Self::sides(x, y) {
                if side == edge {
                    continue;
                }
                if let Some(id) = self.edge_id(side) {
                    adjacent.push(StateCost::new(id, 1.0));
                }
            }
        }
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::SearchResult;
    use crate::solver::Pather;

    fn open(size: usize) -> SectorMap {
        let mut map = SectorMap::new(size);
        for x in 0..size {
            for y in 0..size {
                map.set_ports(x, y, ALL_PORTS);
            }
        }
        map
    }

    fn neighbours(map: &SectorMap, edge: GridEdge) -> Vec<GridEdge> {
        let mut adjacent = Vec::new();
        map.adjacent_cost(map.edge_id(edge).unwrap(), &mut adjacent);
        assert!(adjacent.iter().all(|sc| sc.cost == 1.0));
        adjacent.iter().map(|sc| map.grid_edge(sc.state)).collect()
    }

    #[test]
    fn test_edge_handles() {
        let map = open(3);
        assert_eq!(map.node_count(), 24);
        for node in 0..map.node_count() {
            let edge = map.grid_edge(NodeId(node));
            assert_eq!(map.edge_id(edge), Some(NodeId(node)));
        }
        assert_eq!(map.edge_id(GridEdge::vertical(4, 0)), None);
        assert_eq!(map.edge_id(GridEdge::horizontal(0, 4)), None);
    }

    #[test]
    fn test_interior_edge_touches_both_sectors() {
        let map = open(2);
        let found = neighbours(&map, GridEdge::vertical(1, 0));
        assert_eq!(
            found,
            vec![
                GridEdge::vertical(0, 0),
                GridEdge::horizontal(0, 0),
                GridEdge::horizontal(0, 1),
                GridEdge::vertical(2, 0),
                GridEdge::horizontal(1, 0),
                GridEdge::horizontal(1, 1),
            ]
        );
        // Border edge: one sector only.
        assert_eq!(neighbours(&map, GridEdge::horizontal(1, 2)).len(), 3);
    }

    #[test]
    fn test_closed_port_removes_edge() {
        let mut map = open(2);
        map.set_ports(0, 0, ALL_PORTS & !POS_X);
        assert!(!map.has_edge(GridEdge::vertical(1, 0)));
        assert_eq!(map.edge_id(GridEdge::vertical(1, 0)), None);
        assert!(!neighbours(&map, GridEdge::vertical(0, 0)).contains(&GridEdge::vertical(1, 0)));
        assert_eq!(map.sector_edges(0, 0).len(), 3);
    }

    #[test]
    fn test_solve_straight_across() {
        let map = open(3);
        let start = map.edge_id(GridEdge::vertical(0, 1)).unwrap();
        let goal = map.edge_id(GridEdge::vertical(3, 1)).unwrap();
        assert_eq!(map.least_cost_estimate(start, goal), 3.0);

        let mut pather = Pather::new(200);
        let result = pather.solve(&map, start, goal);
        let path: Vec<GridEdge> = result
            .path()
            .unwrap()
            .iter()
            .map(|&node| map.grid_edge(node))
            .collect();
        assert_eq!(
            path,
            vec![
                GridEdge::vertical(0, 1),
                GridEdge::vertical(1, 1),
                GridEdge::vertical(2, 1),
                GridEdge::vertical(3, 1),
            ]
        );
        assert_eq!(result.cost(), Some(3.0));
    }

    #[test]
    fn test_solve_around_closed_port() {
        let mut map = open(2);
        map.set_ports(0, 0, ALL_PORTS & !POS_X);
        let start = map.edge_id(GridEdge::vertical(0, 0)).unwrap();
        let goal = map.edge_id(GridEdge::vertical(2, 0)).unwrap();

        let mut pather = Pather::new(200);
        let result = pather.solve(&map, start, goal);
        let path: Vec<GridEdge> = result
            .path()
            .unwrap()
            .iter()
            .map(|&node| map.grid_edge(node))
            .collect();
        assert_eq!(
            path,
            vec![
                GridEdge::vertical(0, 0),
                GridEdge::horizontal(0, 1),
                GridEdge::vertical(1, 1),
                GridEdge::horizontal(1, 1),
                GridEdge::vertical(2, 0),
            ]
        );
        assert_eq!(result.cost(), Some(4.0));
    }

    #[test]
    fn test_sealed_sector_is_unreachable() {
        let mut map = open(3);
        map.set_ports(1, 1, 0);
        // Every side of the middle sector is gone.
        assert!(map.sector_edges(1, 1).is_empty());

        // Reach it through a node handle of a missing edge.
        let inner = NodeId(5);
        assert_eq!(map.grid_edge(inner), GridEdge::vertical(1, 1));
        let start = map.edge_id(GridEdge::vertical(0, 0)).unwrap();
        let mut pather = Pather::new(200);
        assert_eq!(pather.solve(&map, start, inner), SearchResult::NoSolution);
    }

    #[test]
    fn test_near_states_travel_budget() {
        let map = open(3);
        let start = map.edge_id(GridEdge::vertical(1, 1)).unwrap();
        let mut pather = Pather::new(0);

        let near = pather.solve_for_near_states(&map, start, 1.0);
        assert_eq!(near.len(), 7);
        assert_eq!(near[0], StateCost::new(start, 0.0));
        assert!(near[1..].iter().all(|sc| sc.cost == 1.0));

        // Every side of every sector is within three crossings.
        let all = pather.solve_for_near_states(&map, start, 3.0);
        assert_eq!(all.len(), map.node_count());
    }

    #[test]
    fn test_load_from_yaml() {
        let map = SectorMap::from_yaml_str(
            "ports:\n  - [15, 13]\n  - [15, 15]\n",
        )
        .unwrap();
        assert_eq!(map.size(), 2);
        assert_eq!(map.ports(1, 0), ALL_PORTS & !POS_X);
        assert!(!map.has_edge(GridEdge::vertical(2, 0)));
        assert!(map.has_edge(GridEdge::vertical(2, 1)));

        assert!(SectorMap::from_yaml_str("ports:\n  - [15, 15]\n").is_err());
        assert!(SectorMap::from_yaml_str("ports:\n  - [16]\n").is_err());
        assert!(SectorMap::from_file("map_file/test/missing.yaml").is_err());
    }
}
