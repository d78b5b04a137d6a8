use anyhow::anyhow;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "Rust Evac",
    about = "Checks, step by step, whether an evacuee can still reach the exit among recorded agents.",
    version = "1.0"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay the movement log and report exit reachability per time step
    Simulate(SimulateArgs),
    /// Place random start and exit markers into a base map
    PlaceMarkers(PlaceMarkersArgs),
}

#[derive(Args, Debug, Default)]
pub struct SimulateArgs {
    #[arg(long, help = "Path to the YAML config file")]
    pub config: Option<String>,

    #[arg(long, help = "Path to the map file carrying '!' and 'X' markers")]
    pub map_path: Option<String>,

    #[arg(long, help = "Path to the agent movement log")]
    pub log_path: Option<String>,

    #[arg(long, help = "Directory for annotated map snapshots")]
    pub visualization_dir: Option<String>,

    #[arg(long, help = "Disable annotated map snapshots", default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, help = "Path for the JSON simulation report")]
    pub report_path: Option<String>,

    #[arg(long, help = "Abort a single search after this many node expansions")]
    pub max_expansions: Option<usize>,
}

#[derive(Args, Debug)]
pub struct PlaceMarkersArgs {
    #[arg(help = "Name of the input map file (e.g. maze-32-32-2.map)")]
    pub filename: String,

    #[arg(long, help = "Folder containing input maps", default_value = "maps")]
    pub input_dir: String,

    #[arg(
        long,
        help = "Folder for saving modified maps",
        default_value = "maps_exit_person"
    )]
    pub output_dir: String,

    #[arg(
        long,
        help = "Seed for the random number generator",
        default_value_t = 0
    )]
    pub seed: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub map_path: String,
    pub log_path: String,
    pub visualization_dir: Option<String>,
    pub report_path: Option<String>,
    pub max_expansions: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            map_path: "maps_exit_person/maze-32-32-2_exit_person.map".to_string(),
            log_path: "output_paths/test".to_string(),
            visualization_dir: Some("maps_exit_person/visualizations_paths".to_string()),
            report_path: None,
            max_expansions: None,
        }
    }
}

impl Config {
    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn override_from_command_line(mut self, args: &SimulateArgs) -> anyhow::Result<Self> {
        if let Some(map_path) = &args.map_path {
            self.map_path = map_path.clone();
        }
        if let Some(log_path) = &args.log_path {
            self.log_path = log_path.clone();
        }
        if let Some(visualization_dir) = &args.visualization_dir {
            self.visualization_dir = Some(visualization_dir.clone());
        }
        if args.no_visualization {
            self.visualization_dir = None;
        }
        if let Some(report_path) = &args.report_path {
            self.report_path = Some(report_path.clone());
        }
        if args.max_expansions.is_some() {
            self.max_expansions = args.max_expansions;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.map_path.is_empty() {
            return Err(anyhow!("Map path must not be empty"));
        }
        if self.log_path.is_empty() {
            return Err(anyhow!("Log path must not be empty"));
        }
        if self.max_expansions == Some(0) {
            return Err(anyhow!("Expansion limit must be greater than 0, got 0"));
        }
        Ok(())
    }
}
