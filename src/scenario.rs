use anyhow::{anyhow, bail, Context, Result};
use rand::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use tracing::info;

use crate::map::GridMap;

/// One query of a MovingAI scenario, with the known optimal cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub bucket: usize,
    pub start_x: usize,
    pub start_y: usize,
    pub goal_x: usize,
    pub goal_y: usize,
    pub optimal_length: f64,
}

impl Route {
    pub fn start(&self) -> (usize, usize) {
        (self.start_x, self.start_y)
    }

    pub fn goal(&self) -> (usize, usize) {
        (self.goal_x, self.goal_y)
    }
}

type Bucket = Vec<Route>;

#[derive(Debug)]
pub struct Scenario {
    pub map: String,
    pub map_width: usize,
    pub map_height: usize,
    pub buckets: BTreeMap<usize, Bucket>,
}

impl Scenario {
    pub fn load_from_scen(path: &str) -> Result<Scenario> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("failed to read scenario {path}"))?;
        Self::parse(&contents).with_context(|| format!("invalid scenario {path}"))
    }

    pub fn parse(contents: &str) -> Result<Scenario> {
        let mut lines = contents.lines();

        // First line is "version x.x"
        match lines.next() {
            Some(line) if line.starts_with("version") => {}
            other => bail!("expected version line, found {other:?}"),
        }

        let mut scenario = Scenario {
            map: String::new(),
            map_width: 0,
            map_height: 0,
            buckets: BTreeMap::new(),
        };

        for (number, line) in lines.enumerate() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.is_empty() {
                continue;
            }
            if parts.len() != 9 {
                bail!("line {}: expected 9 columns, found {}", number + 2, parts.len());
            }
            let field = |index: usize| -> Result<usize> {
                parts[index]
                    .parse()
                    .with_context(|| format!("line {}: bad column {index}", number + 2))
            };

            // Columns are x = column, y = row; positions here are (row, column).
            let route = Route {
                bucket: field(0)?,
                start_x: field(5)?,
                start_y: field(4)?,
                goal_x: field(7)?,
                goal_y: field(6)?,
                optimal_length: parts[8]
                    .parse()
                    .with_context(|| format!("line {}: bad optimal length", number + 2))?,
            };

            if scenario.map.is_empty() {
                scenario.map = parts[1].to_string();
                scenario.map_width = field(2)?;
                scenario.map_height = field(3)?;
            }

            scenario.buckets.entry(route.bucket).or_default().push(route);
        }

        Ok(scenario)
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// One unused route from each listed bucket, in order.
    pub fn generate_routes_by_buckets<R: Rng + ?Sized>(
        &self,
        route_buckets: &[usize],
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        let mut routes = Vec::new();
        let mut used_routes: HashMap<usize, HashSet<usize>> = HashMap::new();

        for &bucket_index in route_buckets {
            let bucket = self
                .buckets
                .get(&bucket_index)
                .ok_or_else(|| anyhow!("Bucket {bucket_index} not found"))?;

            let available_routes: Vec<usize> = (0..bucket.len())
                .filter(|idx| {
                    used_routes
                        .get(&bucket_index)
                        .is_none_or(|used| !used.contains(idx))
                })
                .collect();

            let route_index = available_routes
                .choose(rng)
                .ok_or_else(|| anyhow!("No available routes left in bucket {bucket_index}"))?;

            routes.push(bucket[*route_index].clone());
            used_routes
                .entry(bucket_index)
                .or_default()
                .insert(*route_index);
        }

        info!("Generate routes: {}", routes.len());
        Ok(routes)
    }

    /// `num_routes` distinct routes drawn from the whole scenario.
    pub fn generate_routes_randomly<R: Rng + ?Sized>(
        &self,
        num_routes: usize,
        rng: &mut R,
    ) -> Result<Vec<Route>> {
        let available = self.len();
        if available < num_routes {
            bail!("Scenario has {available} routes, {num_routes} requested");
        }

        let mut routes: Vec<Route> = self.buckets.values().flatten().cloned().collect();
        routes.shuffle(rng);
        routes.truncate(num_routes);

        info!("Generate routes: {}", routes.len());
        Ok(routes)
    }
}

/// Every route starts and ends on `map`.
pub fn check_routes(routes: &[Route], map: &GridMap) -> Result<()> {
    for route in routes {
        if !map.contains(route.start()) || !map.contains(route.goal()) {
            bail!(
                "route {:?} -> {:?} leaves the {}x{} map",
                route.start(),
                route.goal(),
                map.height,
                map.width
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::Connectivity;
    use crate::solver::Pather;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_read_scenario() {
        let scen = Scenario::load_from_scen("map_file/test/wall.scen")
            .expect("Error loading scenario");

        assert_eq!(scen.map, "wall.map");
        assert_eq!((scen.map_width, scen.map_height), (5, 5));
        assert_eq!(scen.len(), 4);
        assert_eq!(scen.buckets[&0].len(), 2);
        assert_eq!(
            scen.buckets[&1][1],
            Route {
                bucket: 1,
                start_x: 0,
                start_y: 4,
                goal_x: 4,
                goal_y: 4,
                optimal_length: 4.0,
            }
        );
    }

    #[test]
    fn test_parse_rejects_bad_lines() {
        assert!(Scenario::parse("0\tm.map\t5\t5\t0\t0\t1\t1\t2\n").is_err());
        assert!(Scenario::parse("version 1\n0\tm.map\t5\t5\t0\t0\t1\t1\n").is_err());
        assert!(Scenario::parse("version 1\n0\tm.map\t5\t5\t0\tx\t1\t1\t2\n").is_err());
        assert!(Scenario::parse("version 1\n").unwrap().is_empty());
    }

    #[test]
    fn test_generate_routes_by_buckets() {
        let scen = Scenario::load_from_scen("map_file/test/wall.scen").unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        let routes = scen.generate_routes_by_buckets(&[0, 1, 0], &mut rng).unwrap();
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].bucket, 0);
        assert_eq!(routes[1].bucket, 1);
        assert_eq!(routes[2].bucket, 0);
        // Routes within a bucket are not reused.
        assert_ne!(routes[0], routes[2]);

        assert!(scen.generate_routes_by_buckets(&[1, 1, 1], &mut rng).is_err());
        assert!(scen.generate_routes_by_buckets(&[7], &mut rng).is_err());
    }

    #[test]
    fn test_generate_routes_randomly() {
        let scen = Scenario::load_from_scen("map_file/test/wall.scen").unwrap();

        let first = scen
            .generate_routes_randomly(3, &mut StdRng::seed_from_u64(42))
            .unwrap();
        let again = scen
            .generate_routes_randomly(3, &mut StdRng::seed_from_u64(42))
            .unwrap();
        assert_eq!(first, again);
        assert_eq!(first.len(), 3);
        for (i, route) in first.iter().enumerate() {
            assert!(!first[i + 1..].contains(route));
        }

        assert!(scen
            .generate_routes_randomly(5, &mut StdRng::seed_from_u64(42))
            .is_err());
    }

    #[test]
    fn test_check_routes_against_map() {
        let scen = Scenario::load_from_scen("map_file/test/wall.scen").unwrap();
        let map = GridMap::from_file("map_file/test/wall.map", Connectivity::Four).unwrap();
        let mut routes: Vec<Route> = scen.buckets.values().flatten().cloned().collect();
        assert!(check_routes(&routes, &map).is_ok());

        // Column 5 of a 5-wide map.
        let scen = Scenario::parse("version 1\n0\twall.map\t5\t5\t5\t0\t0\t0\t5\n").unwrap();
        routes.extend(scen.buckets.values().flatten().cloned());
        assert!(check_routes(&routes, &map).is_err());
    }

    #[test]
    fn test_scenario_optimal_lengths() {
        let scen = Scenario::load_from_scen("map_file/test/wall.scen").unwrap();
        let map = GridMap::from_file("map_file/test/wall.map", Connectivity::Four).unwrap();
        let mut pather = Pather::new(1000);

        for route in scen.buckets.values().flatten() {
            let result = pather.solve(&map, map.node(route.start()), map.node(route.goal()));
            assert_eq!(result.cost(), Some(route.optimal_length as f32), "{route:?}");
        }
    }
}
