use serde::Serialize;
use tracing::info;

/// Running counters of one solver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub solves: usize,
    pub start_equals_goal: usize,
    pub cache_hits: usize,
    pub searches: usize,
    pub no_solution: usize,
    pub near_state_queries: usize,
    pub expanded_nodes: usize,
    pub frontier_pushes: usize,
    pub time_us: usize,
}

impl Stats {
    pub fn print(&self) {
        info!(
            "Solves {:?} (trivial {:?}, cached {:?}, searched {:?}, unreachable {:?}) Near-state queries {:?} Expanded nodes {:?} Frontier pushes {:?} Time(microseconds) {:?}",
            self.solves,
            self.start_equals_goal,
            self.cache_hits,
            self.searches,
            self.no_solution,
            self.near_state_queries,
            self.expanded_nodes,
            self.frontier_pushes,
            self.time_us
        );
    }
}
