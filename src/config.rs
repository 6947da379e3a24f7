use anyhow::{anyhow, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::map::Connectivity;

#[derive(Parser, Debug, Default)]
#[command(
    name = "pather",
    about = "A* path solver with a route cache, benchmarked on MovingAI maps.",
    version = "0.1"
)]
pub struct Cli {
    #[arg(long, help = "Path to a YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the scenario file")]
    pub scen_path: Option<String>,

    #[arg(long, help = "Path to the JSON report")]
    pub output_path: Option<String>,

    #[arg(long, help = "Number of routes drawn from the scenario")]
    pub num_queries: Option<usize>,

    #[arg(long, help = "Seed for the random number generator")]
    pub seed: Option<u64>,

    #[arg(long, help = "Path cache capacity in entries, 0 disables it")]
    pub cache_size: Option<usize>,

    #[arg(long, help = "Allow diagonal moves", default_value_t = false)]
    pub eight_connected: bool,

    #[arg(long, help = "Times each route is solved")]
    pub repeat: Option<usize>,

    #[arg(long, help = "Cost budget for near-state queries from each start")]
    pub near_budget: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub map_path: String,
    pub scen_path: String,
    pub output_path: Option<String>,
    pub num_queries: usize,
    pub seed: u64,
    pub cache_size: usize,
    pub connectivity: Connectivity,
    pub repeat: usize,
    pub near_budget: Option<f32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: "map_file/test/wall.map".to_string(),
            scen_path: "map_file/test/wall.scen".to_string(),
            output_path: None,
            num_queries: 4,
            seed: 0,
            cache_size: 4096,
            connectivity: Connectivity::Four,
            repeat: 2,
            near_budget: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Command line values win over the config file.
    pub fn override_from_command_line(mut self, cli: &Cli) -> Result<Self> {
        if let Some(map_path) = &cli.map_path {
            self.map_path = map_path.clone();
        }
        if let Some(scen_path) = &cli.scen_path {
            self.scen_path = scen_path.clone();
        }
        if let Some(output_path) = &cli.output_path {
            self.output_path = Some(output_path.clone());
        }
        if let Some(num_queries) = cli.num_queries {
            self.num_queries = num_queries;
        }
        if let Some(seed) = cli.seed {
            self.seed = seed;
        }
        if let Some(cache_size) = cli.cache_size {
            self.cache_size = cache_size;
        }
        if cli.eight_connected {
            self.connectivity = Connectivity::Eight;
        }
        if let Some(repeat) = cli.repeat {
            self.repeat = repeat;
        }
        if let Some(near_budget) = cli.near_budget {
            self.near_budget = Some(near_budget);
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_queries == 0 {
            return Err(anyhow!("Number of queries must be at least 1"));
        }
        if self.repeat == 0 {
            return Err(anyhow!("Repeat count must be at least 1"));
        }
        if let Some(budget) = self.near_budget {
            if budget.is_nan() || budget < 0.0 {
                return Err(anyhow!(
                    "Near-state budget must be a non-negative number, got {}",
                    budget
                ));
            }
        }
        Ok(())
    }
}
