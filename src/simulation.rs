use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use tracing::{info, warn};

use crate::algorithm::a_star_search;
use crate::common::{Path, Position, SearchResult};
use crate::config::Config;
use crate::diagnosis::{find_blocker, Blockage};
use crate::error::{EvacError, EvacResult};
use crate::map::GridMap;
use crate::render;
use crate::scenario::{Scenario, EXIT_GLYPH};
use crate::stat::Stats;
use crate::timeline::ObstacleTimeline;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepOutcome {
    Reachable {
        path: Path,
    },
    Blocked {
        diagnosis: Blockage,
        visualization: Option<PathBuf>,
    },
    Aborted {
        expanded: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub time: usize,
    pub occupied: usize,
    pub outcome: StepOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LastSuccess {
    pub time: usize,
    pub path: Path,
    pub visualization: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub start: Position,
    pub exit: Position,
    pub max_time: usize,
    pub reference_path: Path,
    pub steps: Vec<StepReport>,
    pub last_success: Option<LastSuccess>,
    pub stats: Stats,
}

impl SimulationReport {
    /// Writes the report as pretty JSON. Nothing is written when no step ever found a
    /// path; the return value tells whether the file was produced.
    pub fn write_json(&self, path: &str) -> anyhow::Result<bool> {
        if self.last_success.is_none() {
            return Ok(false);
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(true)
    }
}

/// Replays the movement log one time step at a time, re-planning the evacuee's
/// route against each static snapshot.
pub struct Simulation {
    map: GridMap,
    timeline: ObstacleTimeline,
    raw_map: String,
    start: Position,
    config: Config,
    stats: Stats,
}

impl Simulation {
    pub fn new(scenario: Scenario, timeline: ObstacleTimeline, config: Config) -> EvacResult<Self> {
        let mut map = GridMap::parse(&scenario.raw_map)?;
        map.set_exit(scenario.exit.0, scenario.exit.1)?;
        info!(
            "Map loaded ({}x{}), exit set to {:?}",
            map.width, map.height, scenario.exit
        );

        Ok(Simulation {
            map,
            timeline,
            raw_map: scenario.raw_map,
            start: scenario.start,
            config,
            stats: Stats::default(),
        })
    }

    pub fn from_config(config: Config) -> EvacResult<Self> {
        let scenario = Scenario::load_from_file(&config.map_path)?;
        let timeline = ObstacleTimeline::from_file(&config.log_path)?;
        info!(
            "Agent data loaded: {} ({} agents, max time {})",
            config.log_path,
            timeline.num_agents(),
            timeline.max_time()
        );
        Self::new(scenario, timeline, config)
    }

    pub fn run(&mut self) -> EvacResult<SimulationReport> {
        let total_start_time = Instant::now();
        let exit = self.map.exit().ok_or(EvacError::MissingMarker { glyph: EXIT_GLYPH })?;

        let reference_path = match self.search(exit, &HashSet::new()) {
            SearchResult::Found(path) => path,
            SearchResult::NoPath => {
                return Err(EvacError::Unreachable {
                    start: self.start,
                    exit,
                })
            }
            SearchResult::Aborted { expanded } => {
                return Err(EvacError::SearchAborted { expanded })
            }
        };

        let max_time = self.timeline.max_time();
        info!(
            "Simulation start (0 to {max_time}): evacuee {:?} -> exit {exit:?}",
            self.start
        );

        let mut steps = Vec::with_capacity(max_time + 1);
        let mut last_success: Option<(usize, Path)> = None;

        for time in 0..=max_time {
            let occupied = self.timeline.occupied_at(time);
            let outcome = match self.search(exit, &occupied) {
                SearchResult::Found(path) => {
                    info!("Time {time:02}: escape POSSIBLE ({} steps)", path.len() - 1);
                    last_success = Some((time, path.clone()));
                    StepOutcome::Reachable { path }
                }
                SearchResult::NoPath => {
                    let diagnosis = find_blocker(&reference_path, &occupied, &self.timeline, time);
                    let visualization =
                        self.visualize(time, exit, &reference_path, &occupied, false)?;
                    match &visualization {
                        Some(file) => info!(
                            "Time {time:02}: escape IMPOSSIBLE -> {diagnosis} [Map: {}]",
                            file.display()
                        ),
                        None => info!("Time {time:02}: escape IMPOSSIBLE -> {diagnosis}"),
                    }
                    StepOutcome::Blocked {
                        diagnosis,
                        visualization,
                    }
                }
                SearchResult::Aborted { expanded } => {
                    warn!("Time {time:02}: search aborted after {expanded} expansions");
                    StepOutcome::Aborted { expanded }
                }
            };

            steps.push(StepReport {
                time,
                occupied: occupied.len(),
                outcome,
            });
        }

        let last_success = match last_success {
            Some((time, path)) => {
                let occupied = self.timeline.occupied_at(time);
                let visualization = self.visualize(time, exit, &path, &occupied, true)?;
                match &visualization {
                    Some(file) => info!(
                        "Last successful path (t={time}) saved to {}",
                        file.display()
                    ),
                    None => info!("Last successful path at t={time}: {path:?}"),
                }
                Some(LastSuccess {
                    time,
                    path,
                    visualization,
                })
            }
            None => {
                warn!("No path was found at any time step");
                None
            }
        };

        self.stats.time_us = total_start_time.elapsed().as_micros() as usize;
        self.stats.print();

        Ok(SimulationReport {
            start: self.start,
            exit,
            max_time,
            reference_path,
            steps,
            last_success,
            stats: self.stats.clone(),
        })
    }

    fn search(&mut self, exit: Position, occupied: &HashSet<Position>) -> SearchResult {
        a_star_search(
            &self.map,
            self.start,
            exit,
            occupied,
            self.config.max_expansions,
            &mut self.stats,
        )
    }

    fn visualize(
        &self,
        time: usize,
        exit: Position,
        path: &[Position],
        occupied: &HashSet<Position>,
        success: bool,
    ) -> EvacResult<Option<PathBuf>> {
        let Some(dir) = &self.config.visualization_dir else {
            return Ok(None);
        };
        let content = render::annotate(&self.raw_map, self.start, exit, path, occupied, success)?;
        render::save(dir, time, success, &content).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: &str = "type octile
height 3
width 5
map
!....
.@@@.
....X
";

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init();
    }

    fn config() -> Config {
        Config {
            visualization_dir: None,
            ..Default::default()
        }
    }

    fn simulation(log: &str, config: Config) -> Simulation {
        let scenario = Scenario::from_map_str(MAP).unwrap();
        let timeline = ObstacleTimeline::parse(log).unwrap();
        Simulation::new(scenario, timeline, config).unwrap()
    }

    #[test]
    fn test_blocked_then_clear() {
        init_tracing();
        // Agent 0 closes the upper corridor for good; agent 1 joins it from t1 on.
        let log = "Agent 0:(4,0)->(4,1)\nAgent 1:(2,0)->(1,2)->(0,1)\n";
        let report = simulation(log, config()).run().unwrap();

        assert_eq!(report.max_time, 2);
        assert_eq!(report.reference_path.len(), 7);
        assert_eq!(report.steps.len(), 3);

        // t0: the lower corridor is open.
        assert!(matches!(
            report.steps[0].outcome,
            StepOutcome::Reachable { .. }
        ));
        // t1: (4, 1) and (1, 2) cut both corridors.
        assert!(matches!(
            report.steps[1].outcome,
            StepOutcome::Blocked {
                diagnosis: Blockage::Direct { .. },
                ..
            }
        ));
        // t2: parked (4, 1) and (0, 1) still cut both corridors.
        assert!(matches!(
            report.steps[2].outcome,
            StepOutcome::Blocked { .. }
        ));

        let last = report.last_success.unwrap();
        assert_eq!(last.time, 0);
        assert_eq!(last.path.first(), Some(&(0, 0)));
        assert_eq!(last.path.last(), Some(&(4, 2)));
    }

    #[test]
    fn test_never_reachable() {
        let log = "Agent 0:(4,2)\n";
        let report = simulation(log, config()).run().unwrap();

        assert_eq!(report.steps.len(), 1);
        assert_eq!(
            report.steps[0].outcome,
            StepOutcome::Blocked {
                diagnosis: Blockage::Direct {
                    agent: Some(0),
                    cell: (4, 2)
                },
                visualization: None,
            }
        );
        assert!(report.last_success.is_none());
    }

    #[test]
    fn test_no_report_without_success() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.json");
        let report = simulation("Agent 0:(4,2)\n", config()).run().unwrap();

        assert!(!report.write_json(report_path.to_str().unwrap()).unwrap());
        assert!(!report_path.exists());
    }

    #[test]
    fn test_exit_comes_from_map() {
        let mut simulation = simulation("(2,0)", config());
        assert_eq!(simulation.map.exit(), Some((4, 2)));

        let report = simulation.run().unwrap();
        assert_eq!(report.exit, (4, 2));
        assert_eq!(report.reference_path.last(), Some(&(4, 2)));
    }

    #[test]
    fn test_unassigned_exit_is_reported() {
        let mut simulation = simulation("(2,0)", config());
        simulation.map = GridMap::parse(MAP).unwrap();
        assert!(matches!(
            simulation.run(),
            Err(EvacError::MissingMarker { glyph: EXIT_GLYPH })
        ));
    }

    #[test]
    fn test_statically_unreachable() {
        let walled = "height 2\nwidth 3\nmap\n!@X\n.@.\n";
        let scenario = Scenario::from_map_str(walled).unwrap();
        let timeline = ObstacleTimeline::parse("(0,1)").unwrap();
        let mut simulation = Simulation::new(scenario, timeline, config()).unwrap();
        assert!(matches!(
            simulation.run(),
            Err(EvacError::Unreachable { .. })
        ));
    }

    #[test]
    fn test_exit_on_wall_is_rejected() {
        let scenario = Scenario {
            raw_map: MAP.to_string(),
            start: (0, 0),
            exit: (1, 1),
        };
        let timeline = ObstacleTimeline::parse("(0,2)").unwrap();
        assert!(matches!(
            Simulation::new(scenario, timeline, config()),
            Err(EvacError::InvalidExit { .. })
        ));
    }

    #[test]
    fn test_aborted_reference_search() {
        let config = Config {
            max_expansions: Some(2),
            ..config()
        };
        let mut simulation = simulation("(2,2)", config);
        assert!(matches!(
            simulation.run(),
            Err(EvacError::SearchAborted { expanded: 2 })
        ));
    }

    #[test]
    fn test_visualizations_written() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            visualization_dir: Some(dir.path().to_str().unwrap().to_string()),
            ..config()
        };
        let log = "Agent 0:(2,2)->(4,1)\nAgent 1:(3,2)->(1,0)\n";
        let report = simulation(log, config).run().unwrap();

        assert!(matches!(
            report.steps[0].outcome,
            StepOutcome::Reachable { .. }
        ));
        match &report.steps[1].outcome {
            StepOutcome::Blocked {
                visualization: Some(file),
                ..
            } => assert!(file.ends_with("BLOCKED_viz_t01.map")),
            other => panic!("expected blocked step, got {other:?}"),
        }

        let last = report.last_success.unwrap();
        assert_eq!(last.time, 0);
        assert!(dir.path().join("path_viz_t00.map").exists());
    }

    #[test]
    fn test_report_json() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("report.json");
        let report = simulation("(4,0)->(4,1)", config()).run().unwrap();
        assert!(report.write_json(report_path.to_str().unwrap()).unwrap());

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(report_path).unwrap()).unwrap();
        assert_eq!(json["max_time"], 1);
        assert_eq!(json["steps"].as_array().unwrap().len(), 2);
    }
}
