use std::collections::{HashMap, HashSet};
use std::fs;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::common::{Path, Position};
use crate::error::{EvacError, EvacResult};

static COORDINATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\((\d+),(\d+)\)").expect("coordinate pattern is valid")
});

/// Time-indexed occupancy built from recorded agent trajectories.
///
/// Agents are numbered from zero in the order their log lines yield at least one
/// coordinate. An agent whose path ends early stays parked on its final cell until
/// the global horizon.
#[derive(Debug, Clone, Default)]
pub struct ObstacleTimeline {
    obstacles_at_time: HashMap<usize, Vec<Position>>,
    agent_lookup: HashMap<(usize, Position), usize>,
    num_agents: usize,
    max_time: usize,
}

impl ObstacleTimeline {
    pub fn from_file(path: &str) -> EvacResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> EvacResult<Self> {
        let agent_paths = parse_agent_paths(content)?;
        if agent_paths.is_empty() {
            return Err(EvacError::EmptyLog);
        }
        Ok(Self::from_paths(&agent_paths))
    }

    pub fn from_paths(agent_paths: &[Path]) -> Self {
        let mut timeline = ObstacleTimeline {
            max_time: agent_paths
                .iter()
                .map(|path| path.len().saturating_sub(1))
                .max()
                .unwrap_or(0),
            ..Default::default()
        };

        for (agent, path) in agent_paths.iter().enumerate() {
            let Some(&last) = path.last() else {
                continue;
            };
            for (time, &position) in path.iter().enumerate() {
                timeline.record(agent, time, position);
            }
            for time in path.len()..=timeline.max_time {
                timeline.record(agent, time, last);
            }
            timeline.num_agents += 1;
        }

        debug!(
            "timeline: {} agents, max time {}",
            timeline.num_agents, timeline.max_time
        );
        timeline
    }

    fn record(&mut self, agent: usize, time: usize, position: Position) {
        self.obstacles_at_time
            .entry(time)
            .or_default()
            .push(position);
        // Lowest agent index wins a shared cell.
        self.agent_lookup.entry((time, position)).or_insert(agent);
    }

    /// Deduplicated occupied cells at `time`; empty outside the recorded range.
    pub fn occupied_at(&self, time: usize) -> HashSet<Position> {
        self.obstacles_at_time
            .get(&time)
            .map(|cells| cells.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn max_time(&self) -> usize {
        self.max_time
    }

    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    pub fn agent_at(&self, time: usize, position: Position) -> Option<usize> {
        self.agent_lookup.get(&(time, position)).copied()
    }
}

fn parse_agent_paths(content: &str) -> EvacResult<Vec<Path>> {
    let mut agent_paths = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let path = COORDINATE
            .captures_iter(line)
            .map(|caps| -> EvacResult<Position> {
                Ok((coordinate(&caps[1], index)?, coordinate(&caps[2], index)?))
            })
            .collect::<EvacResult<Path>>()?;
        if !path.is_empty() {
            agent_paths.push(path);
        }
    }
    Ok(agent_paths)
}

fn coordinate(digits: &str, index: usize) -> EvacResult<usize> {
    digits.parse().map_err(|_| EvacError::InvalidLog {
        line: index + 1,
        reason: format!("coordinate {digits} does not fit a grid index"),
    })
}
