use pather::config::{Cli, Config};
use pather::scenario::{check_routes, Route, Scenario};
use pather::{CacheData, GridMap, Pather, SearchResult, Stats};

use anyhow::{bail, Context};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct RouteReport {
    route: Route,
    cost: Option<f32>,
    path_length: Option<usize>,
    near_states: Option<usize>,
}

#[derive(Debug, Serialize)]
struct Report<'a> {
    config: &'a Config,
    routes: Vec<RouteReport>,
    mismatches: usize,
    stats: &'a Stats,
    cache: CacheData,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let cli = Cli::parse();

    let config = if let Some(config_file) = cli.config.as_ref() {
        let config_str = std::fs::read_to_string(config_file)
            .with_context(|| format!("failed to read config file: {config_file}"))?;
        Config::from_yaml_str(&config_str)
            .with_context(|| format!("error with config file: {config_file}"))?
    } else {
        info!("No config file specified, using default config");
        Config::default()
    }
    .override_from_command_line(&cli)?;

    let map = GridMap::from_file(&config.map_path, config.connectivity)?;
    let scenario = Scenario::load_from_scen(&config.scen_path)?;
    if (scenario.map_width, scenario.map_height) != (map.width, map.height) {
        bail!(
            "scenario is for a {}x{} map, {} is {}x{}",
            scenario.map_width,
            scenario.map_height,
            config.map_path,
            map.width,
            map.height
        );
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let routes = scenario.generate_routes_randomly(config.num_queries, &mut rng)?;
    check_routes(&routes, &map)?;

    let mut pather = Pather::new(config.cache_size);
    let mut results = Vec::new();
    for pass in 0..config.repeat {
        results.clear();
        for route in &routes {
            let start = map.node(route.start());
            let goal = map.node(route.goal());
            results.push(pather.solve(&map, start, goal));
        }
        info!("Pass {pass} done");
        pather.stats().print();
    }

    let mut mismatches = 0;
    let mut reports = Vec::with_capacity(routes.len());
    for (route, result) in routes.iter().zip(&results) {
        let cost = result.cost();
        // MovingAI lengths are rounded to a few decimals.
        let matches = cost.is_some_and(|cost| (cost as f64 - route.optimal_length).abs() < 1e-3);
        if !matches {
            warn!(
                "Route {:?} -> {:?}: cost {cost:?}, expected {}",
                route.start(),
                route.goal(),
                route.optimal_length
            );
            mismatches += 1;
        }

        let near_states = config.near_budget.map(|budget| {
            pather
                .solve_for_near_states(&map, map.node(route.start()), budget)
                .len()
        });

        reports.push(RouteReport {
            route: route.clone(),
            cost,
            path_length: match result {
                SearchResult::Solved { path, .. } => Some(path.len()),
                SearchResult::StartEqualsGoal => Some(1),
                SearchResult::NoSolution => None,
            },
            near_states,
        });
    }

    let stats = pather.stats();
    let cache = pather.cache_data();
    stats.print();
    info!(
        "Cache {}/{} bytes ({:.3}), hits {} misses {} ({:.3})",
        cache.bytes_used,
        cache.bytes_allocated,
        cache.memory_fraction,
        cache.hits,
        cache.misses,
        cache.hit_fraction
    );
    info!("{} of {} routes differ from the scenario", mismatches, routes.len());

    if let Some(output_path) = &config.output_path {
        let report = Report {
            config: &config,
            routes: reports,
            mismatches,
            stats,
            cache,
        };
        let file = File::create(output_path)
            .with_context(|| format!("failed to create report {output_path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &report)?;
        info!("Report written to {output_path}");
    }

    Ok(())
}
