mod algorithm;
pub mod cache;
mod common;
pub mod config;
pub mod graph;
pub mod map;
pub mod scenario;
pub mod sector;
pub mod solver;
pub mod stat;

pub use cache::{CacheData, PathCache};
pub use common::{NodeId, Path, SearchResult, StateCost, IMPASSABLE};
pub use graph::Graph;
pub use map::{Connectivity, GridMap};
pub use sector::{GridEdge, SectorMap};
pub use solver::Pather;
pub use stat::Stats;
