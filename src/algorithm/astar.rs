use super::{construct_path, heuristic};
use crate::common::{Position, SearchResult};
use crate::map::GridMap;
use crate::stat::Stats;

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};
use tracing::{debug, instrument, trace};

#[derive(Clone, Debug, PartialEq, Eq)]
struct OpenNode {
    position: Position,
    f_cost: usize,
    g_cost: usize,
}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.f_cost
            .cmp(&other.f_cost)
            // Deeper node first among equal f, it is closer to the goal.
            .then_with(|| other.g_cost.cmp(&self.g_cost))
            // Fixed coordinate order keeps the returned path deterministic.
            .then_with(|| self.position.cmp(&other.position))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest 4-connected path from `start` to `goal` on one static snapshot.
///
/// Walls and every cell in `occupied` are impassable. A blocked or out-of-bounds
/// endpoint yields [`SearchResult::NoPath`] without searching. When `max_expansions`
/// is reached before the search terminates the result is [`SearchResult::Aborted`].
#[instrument(skip_all, name = "a_star", fields(start = format!("{:?}", start), goal = format!("{:?}", goal)), level = "debug")]
pub fn a_star_search(
    map: &GridMap,
    start: Position,
    goal: Position,
    occupied: &HashSet<Position>,
    max_expansions: Option<usize>,
    stats: &mut Stats,
) -> SearchResult {
    stats.searches += 1;

    let blocked = |position: Position| {
        !map.is_walkable(position.0, position.1) || occupied.contains(&position)
    };
    if blocked(start) || blocked(goal) {
        debug!("start or goal is not free");
        return SearchResult::NoPath;
    }

    let mut open_list = BTreeSet::new();
    let mut trace = HashMap::new();
    let mut g_cost_map = HashMap::new();
    let mut expanded = 0;

    open_list.insert(OpenNode {
        position: start,
        f_cost: heuristic(start, goal),
        g_cost: 0,
    });
    g_cost_map.insert(start, 0);

    while let Some(current) = open_list.pop_first() {
        trace!("expand node: {current:?}");

        if current.position == goal {
            debug!("found path with cost {}", current.g_cost);
            return SearchResult::Found(construct_path(&trace, current.position));
        }

        if max_expansions.is_some_and(|limit| expanded >= limit) {
            debug!("expansion limit reached after {expanded} nodes");
            stats.aborted_searches += 1;
            return SearchResult::Aborted { expanded };
        }
        expanded += 1;
        stats.expanded_nodes += 1;

        // Assuming uniform cost.
        let tentative_g_cost = current.g_cost + 1;

        for neighbor in map.get_neighbors(current.position.0, current.position.1) {
            if occupied.contains(&neighbor) {
                continue;
            }

            let old_g_cost = *g_cost_map.get(&neighbor).unwrap_or(&usize::MAX);
            if tentative_g_cost >= old_g_cost {
                continue;
            }

            let h_cost = heuristic(neighbor, goal);
            if old_g_cost != usize::MAX {
                // Drop the stale entry if it is still waiting in the open list.
                open_list.remove(&OpenNode {
                    position: neighbor,
                    f_cost: old_g_cost + h_cost,
                    g_cost: old_g_cost,
                });
            }

            trace.insert(neighbor, current.position);
            g_cost_map.insert(neighbor, tentative_g_cost);
            open_list.insert(OpenNode {
                position: neighbor,
                f_cost: tentative_g_cost + h_cost,
                g_cost: tentative_g_cost,
            });
        }
    }

    debug!("cannot find path after {expanded} expansions");
    SearchResult::NoPath
}
