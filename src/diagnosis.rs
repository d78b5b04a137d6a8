use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::common::{adjacent, Position};
use crate::timeline::ObstacleTimeline;

/// Advisory explanation of why the exit was unreachable at one time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Blockage {
    /// An agent stands on the reference route.
    Direct {
        agent: Option<usize>,
        cell: Position,
    },
    /// An agent stands next to the reference route.
    Nearby {
        agent: Option<usize>,
        cell: Position,
    },
    /// No occupant on or beside the route, e.g. the evacuee is encircled off-route.
    None,
}

impl fmt::Display for Blockage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let agent_label = |agent: &Option<usize>| match agent {
            Some(id) => format!("Agent {id}"),
            None => "unknown agent".to_string(),
        };
        match self {
            Blockage::Direct { agent, cell } => {
                write!(f, "DIRECT: blocked by {} at {cell:?}", agent_label(agent))
            }
            Blockage::Nearby { agent, cell } => {
                write!(f, "NEARBY: blocked by {} near {cell:?}", agent_label(agent))
            }
            Blockage::None => write!(f, "NONE: congestion not attributable to a single cell"),
        }
    }
}

/// Finds the most plausible blocker for a failed search at `time`.
///
/// Scans `reference_path` in route order, first for an occupied route cell, then for an
/// occupied neighbour of a route cell. The result depends only on the route order and
/// set membership, never on how `occupied` enumerates.
pub fn find_blocker(
    reference_path: &[Position],
    occupied: &HashSet<Position>,
    timeline: &ObstacleTimeline,
    time: usize,
) -> Blockage {
    if let Some(&cell) = reference_path.iter().find(|&cell| occupied.contains(cell)) {
        let agent = timeline.agent_at(time, cell);
        debug!("direct collision at {cell:?} with {agent:?}");
        return Blockage::Direct { agent, cell };
    }

    if let Some(cell) = reference_path
        .iter()
        .flat_map(|&step| adjacent(step))
        .find(|cell| occupied.contains(cell))
    {
        let agent = timeline.agent_at(time, cell);
        debug!("occupant next to the route at {cell:?} with {agent:?}");
        return Blockage::Nearby { agent, cell };
    }

    Blockage::None
}
