mod astar;

pub use astar::a_star_search;

use std::collections::HashMap;

use crate::common::{manhattan, Path, Position};

type Trace = HashMap<Position, Position>;

// Admissible and consistent for 4-connected unit-cost moves.
fn heuristic(position: Position, goal: Position) -> usize {
    manhattan(position, goal)
}

fn construct_path(trace: &Trace, mut current: Position) -> Path {
    let mut path = vec![current];
    while let Some(&previous) = trace.get(&current) {
        path.push(previous);
        current = previous;
    }
    path.reverse();
    path
}
