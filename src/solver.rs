use crate::algorithm::{a_star_search, check_handle, dijkstra_search, SearchSpace};
use crate::cache::{CacheData, PathCache};
use crate::common::{NodeId, SearchResult, StateCost};
use crate::graph::Graph;
use crate::stat::Stats;

use std::time::Instant;
use tracing::{debug, instrument};

/// Path solver with a route cache.
///
/// A `Pather` keeps per-node scratch state, the frontier and the path cache
/// between queries, so repeated queries reuse memory and, where routes
/// overlap, skip the search entirely. The graph is passed to every query and
/// never owned; the cache however is only valid for the graph it was filled
/// from, and only while that graph's edges stay unchanged. Call
/// [`Pather::reset`] after editing the graph.
///
/// One `Pather` runs one query at a time. Several `Pather`s may share a graph.
#[derive(Debug)]
pub struct Pather {
    space: SearchSpace,
    cache: PathCache,
    stats: Stats,
}

impl Pather {
    /// `cache_capacity` is the number of route hops the cache can hold; two
    /// thirds of it are ever used. Zero disables caching.
    pub fn new(cache_capacity: usize) -> Self {
        Pather {
            space: SearchSpace::new(),
            cache: PathCache::new(cache_capacity),
            stats: Stats::default(),
        }
    }

    /// Cheapest path from `start` to `goal`.
    ///
    /// Panics if either handle is outside `graph`.
    #[instrument(skip_all, name = "solve", fields(start = start.index(), goal = goal.index()), level = "debug")]
    pub fn solve<G: Graph>(&mut self, graph: &G, start: NodeId, goal: NodeId) -> SearchResult {
        check_handle(graph, start);
        check_handle(graph, goal);

        let timer = Instant::now();
        self.stats.solves += 1;

        let result = if start == goal {
            self.stats.start_equals_goal += 1;
            SearchResult::StartEqualsGoal
        } else if let Some((path, cost)) = self.cache.solve(start, goal) {
            debug!("path cache hit");
            self.stats.cache_hits += 1;
            SearchResult::Solved { path, cost }
        } else {
            debug!("path cache miss");
            self.stats.searches += 1;
            match a_star_search(graph, &mut self.space, start, goal, &mut self.stats) {
                Some(solution) => {
                    self.cache
                        .add(&solution.path, &solution.edge_costs, graph.is_symmetric());
                    SearchResult::Solved {
                        path: solution.path,
                        cost: solution.cost,
                    }
                }
                None => {
                    self.stats.no_solution += 1;
                    SearchResult::NoSolution
                }
            }
        };

        self.stats.time_us += timer.elapsed().as_micros() as usize;
        result
    }

    /// Every node reachable from `start` at a cost of at most `max_cost`,
    /// with that cost, cheapest first. `start` itself comes first at cost 0.
    /// Not cached.
    pub fn solve_for_near_states<G: Graph>(
        &mut self,
        graph: &G,
        start: NodeId,
        max_cost: f32,
    ) -> Vec<StateCost> {
        check_handle(graph, start);

        let timer = Instant::now();
        self.stats.near_state_queries += 1;
        let near = dijkstra_search(graph, &mut self.space, start, max_cost, &mut self.stats);
        self.stats.time_us += timer.elapsed().as_micros() as usize;
        near
    }

    /// Forget every cached route. Must be called whenever the graph's edges
    /// or costs change.
    pub fn reset(&mut self) {
        debug!("path cache reset");
        self.cache.reset();
    }

    pub fn cache_data(&self) -> CacheData {
        self.cache.data()
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }
}
