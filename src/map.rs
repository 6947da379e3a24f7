use std::f32::consts::SQRT_2;
use std::fs;

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::common::{NodeId, StateCost, IMPASSABLE};
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connectivity {
    /// Up, down, left, right at cost 1.
    #[default]
    Four,
    /// Also the diagonals at cost √2, never cutting a blocked corner.
    Eight,
}

/// Tile grid in MovingAI `.map` format. Positions are `(x, y)` with `x` the
/// row and `y` the column.
#[derive(Debug, Clone)]
pub struct GridMap {
    pub height: usize,
    pub width: usize,
    passable: Vec<bool>,
    connectivity: Connectivity,
}

impl GridMap {
    pub fn from_file(path: &str, connectivity: Connectivity) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read map {path}"))?;
        Self::parse(&contents, connectivity).with_context(|| format!("invalid map {path}"))
    }

    pub fn parse(contents: &str, connectivity: Connectivity) -> Result<Self> {
        let mut lines = contents.lines();

        let _type = lines.next().ok_or_else(|| anyhow!("missing type line"))?;
        let height = header_value(lines.next(), "height")?;
        let width = header_value(lines.next(), "width")?;
        match lines.next() {
            Some(line) if line.trim() == "map" => {}
            other => bail!("expected \"map\", found {other:?}"),
        }

        let mut passable = Vec::with_capacity(height * width);
        for x in 0..height {
            let row = lines
                .next()
                .ok_or_else(|| anyhow!("map has {x} rows, header says {height}"))?
                .trim_end();
            if row.chars().count() != width {
                bail!("row {x} has {} tiles, expected {width}", row.chars().count());
            }
            passable.extend(row.chars().map(|ch| matches!(ch, '.' | 'G' | 'S')));
        }

        Ok(GridMap {
            height,
            width,
            passable,
            connectivity,
        })
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn contains(&self, (x, y): (usize, usize)) -> bool {
        x < self.height && y < self.width
    }

    /// Handle of the tile at `(x, y)`.
    pub fn node(&self, (x, y): (usize, usize)) -> NodeId {
        assert!(
            self.contains((x, y)),
            "({x}, {y}) is outside a {}x{} map",
            self.height,
            self.width
        );
        NodeId(x * self.width + y)
    }

    pub fn position(&self, node: NodeId) -> (usize, usize) {
        (node.index() / self.width, node.index() % self.width)
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.passable[x * self.width + y]
    }

    /// Edit the terrain. Routes cached by a `Pather` over this map are stale
    /// afterwards until it is reset.
    pub fn set_passable(&mut self, x: usize, y: usize, passable: bool) {
        self.passable[x * self.width + y] = passable;
    }

    /// In-bounds tile at `(x + dx, y + dy)`.
    fn offset(&self, x: usize, y: usize, dx: isize, dy: isize) -> Option<(usize, usize)> {
        let new_x = x.checked_add_signed(dx)?;
        let new_y = y.checked_add_signed(dy)?;
        (new_x < self.height && new_y < self.width).then_some((new_x, new_y))
    }
}

fn header_value(line: Option<&str>, key: &str) -> Result<usize> {
    let line = line.ok_or_else(|| anyhow!("missing {key} line"))?;
    match line.split_whitespace().collect::<Vec<_>>()[..] {
        [name, value] if name == key => value
            .parse()
            .with_context(|| format!("bad {key} value {value:?}")),
        _ => bail!("expected \"{key} <n>\", found {line:?}"),
    }
}

impl Graph for GridMap {
    fn node_count(&self) -> usize {
        self.passable.len()
    }

    fn least_cost_estimate(&self, from: NodeId, to: NodeId) -> f32 {
        let (ax, ay) = self.position(from);
        let (bx, by) = self.position(to);
        let dx = ax.abs_diff(bx) as f32;
        let dy = ay.abs_diff(by) as f32;
        match self.connectivity {
            Connectivity::Four => dx + dy,
            Connectivity::Eight => {
                let (short, long) = if dx < dy { (dx, dy) } else { (dy, dx) };
                (long - short) + short * SQRT_2
            }
        }
    }

    fn adjacent_cost(&self, node: NodeId, adjacent: &mut Vec<StateCost>) {
        let (x, y) = self.position(node);
        if !self.is_passable(x, y) {
            return;
        }

        for (dx, dy) in [(-1, 0), (1, 0), (0, -1), (0, 1)] {
            if let Some((nx, ny)) = self.offset(x, y, dx, dy) {
                let cost = if self.is_passable(nx, ny) { 1.0 } else { IMPASSABLE };
                adjacent.push(StateCost::new(self.node((nx, ny)), cost));
            }
        }

        if self.connectivity == Connectivity::Eight {
            for (dx, dy) in [(-1, -1), (-1, 1), (1, -1), (1, 1)] {
                if let Some((nx, ny)) = self.offset(x, y, dx, dy) {
                    let open = self.is_passable(nx, ny)
                        && self.is_passable(nx, y)
                        && self.is_passable(x, ny);
                    let cost = if open { SQRT_2 } else { IMPASSABLE };
                    adjacent.push(StateCost::new(self.node((nx, ny)), cost));
                }
            }
        }
    }

    fn is_symmetric(&self) -> bool {
        true
    }
}
