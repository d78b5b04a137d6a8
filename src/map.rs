use std::collections::HashSet;
use std::fs;

use tracing::debug;

use crate::common::{adjacent, Position};
use crate::error::{EvacError, EvacResult};

pub const WALL_GLYPH: char = '@';

/// Static topology: dimensions, wall cells and the exit once assigned.
#[derive(Debug, Clone)]
pub struct GridMap {
    pub height: usize,
    pub width: usize,
    walls: HashSet<Position>,
    exit: Option<Position>,
}

/// Header values and raw grid rows of a map file, shared with the scenario and render code.
pub(crate) struct MapText<'a> {
    pub(crate) height: usize,
    pub(crate) width: usize,
    pub(crate) header: Vec<&'a str>,
    pub(crate) rows: Vec<&'a str>,
}

impl<'a> MapText<'a> {
    pub(crate) fn split(content: &'a str) -> EvacResult<Self> {
        let mut height = None;
        let mut width = None;
        let mut header = Vec::new();
        let mut rows = Vec::new();
        let mut parsing_grid = false;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if parsing_grid {
                rows.push(trimmed);
                continue;
            }

            header.push(trimmed);
            if trimmed.starts_with("height") {
                height = Some(parse_dimension(trimmed)?);
            } else if trimmed.starts_with("width") {
                width = Some(parse_dimension(trimmed)?);
            } else if trimmed.starts_with("map") {
                parsing_grid = true;
            }
        }

        if !parsing_grid {
            return Err(parse_error("missing 'map' marker line"));
        }
        let height = height.ok_or_else(|| parse_error("missing 'height' line"))?;
        let width = width.ok_or_else(|| parse_error("missing 'width' line"))?;
        if height == 0 || width == 0 {
            return Err(parse_error(format!(
                "dimensions must be positive, got {height}x{width}"
            )));
        }

        if rows.len() < height {
            return Err(parse_error(format!(
                "expected {height} grid rows, found {}",
                rows.len()
            )));
        }
        rows.truncate(height);

        if let Some((y, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.chars().count() != width)
        {
            return Err(parse_error(format!(
                "row {y} has {} cells, expected {width}",
                row.chars().count()
            )));
        }

        Ok(MapText {
            height,
            width,
            header,
            rows,
        })
    }
}

fn parse_dimension(line: &str) -> EvacResult<usize> {
    line.split_whitespace()
        .nth(1)
        .and_then(|value| value.parse::<usize>().ok())
        .ok_or_else(|| parse_error(format!("malformed dimension line '{line}'")))
}

fn parse_error(reason: impl Into<String>) -> EvacError {
    EvacError::Parse {
        reason: reason.into(),
    }
}

impl GridMap {
    pub fn from_file(path: &str) -> EvacResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> EvacResult<Self> {
        let text = MapText::split(content)?;

        let mut walls = HashSet::new();
        for (y, row) in text.rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                if ch == WALL_GLYPH {
                    walls.insert((x, y));
                }
            }
        }
        debug!(
            "parsed map {}x{} with {} walls",
            text.width,
            text.height,
            walls.len()
        );

        Ok(GridMap {
            height: text.height,
            width: text.width,
            walls,
            exit: None,
        })
    }

    pub fn in_bounds(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    pub fn is_walkable(&self, x: usize, y: usize) -> bool {
        self.in_bounds(x, y) && !self.walls.contains(&(x, y))
    }

    pub fn is_wall(&self, x: usize, y: usize) -> bool {
        self.walls.contains(&(x, y))
    }

    pub fn wall_count(&self) -> usize {
        self.walls.len()
    }

    /// Assigns the exit once. A walled or out-of-bounds coordinate is rejected
    /// and the wall set is never modified.
    pub fn set_exit(&mut self, x: usize, y: usize) -> EvacResult<()> {
        if !self.in_bounds(x, y) {
            return Err(EvacError::InvalidExit {
                position: (x, y),
                reason: format!("outside the {}x{} map", self.width, self.height),
            });
        }
        if self.is_wall(x, y) {
            return Err(EvacError::InvalidExit {
                position: (x, y),
                reason: "cell is a wall".to_string(),
            });
        }
        self.exit = Some((x, y));
        Ok(())
    }

    pub fn exit(&self) -> Option<Position> {
        self.exit
    }

    pub fn get_neighbors(&self, x: usize, y: usize) -> Vec<Position> {
        adjacent((x, y))
            .filter(|&(nx, ny)| self.is_walkable(nx, ny))
            .collect()
    }

    pub fn walkable_cells(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.height)
            .flat_map(move |y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.is_walkable(x, y))
    }

    pub fn is_on_perimeter(&self, x: usize, y: usize) -> bool {
        x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height
    }
}
