use serde::Serialize;

/// Grid cell as `(x, y)`: `x` is the column, `y` is the row.
pub type Position = (usize, usize);

/// Ordered cells from start to goal, both inclusive.
pub type Path = Vec<Position>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum SearchResult {
    Found(Path),
    NoPath,
    // Expansion cap reached before the frontier emptied.
    Aborted { expanded: usize },
}

impl SearchResult {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<Path> {
        match self {
            SearchResult::Found(path) => Some(path),
            _ => None,
        }
    }
}

pub fn manhattan(a: Position, b: Position) -> usize {
    a.0.abs_diff(b.0) + a.1.abs_diff(b.1)
}

/// Four axis-aligned neighbours in a fixed order: right, left, down, up.
/// Cells that would fall below zero are skipped; upper bounds are the caller's concern.
pub fn adjacent(position: Position) -> impl Iterator<Item = Position> {
    let (x, y) = position;
    let directions: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
    directions.into_iter().filter_map(move |(dx, dy)| {
        Some((x.checked_add_signed(dx)?, y.checked_add_signed(dy)?))
    })
}

/// Every consecutive pair differs by one unit along exactly one axis.
pub fn is_contiguous(path: &[Position]) -> bool {
    path.windows(2).all(|pair| manhattan(pair[0], pair[1]) == 1)
}
