use std::collections::HashSet;
use std::fs;
use std::path::{Path as FsPath, PathBuf};

use crate::common::Position;
use crate::error::EvacResult;
use crate::map::{MapText, WALL_GLYPH};
use crate::scenario::{EXIT_GLYPH, START_GLYPH};

pub const OCCUPANT_GLYPH: char = 'R';
pub const PATH_GLYPH: char = '+';

/// Annotated copy of the map text: occupants as `R`, interior path cells as `+`,
/// start and exit redrawn on top. When `success` is false the path is drawn only up
/// to the first occupied cell.
pub fn annotate(
    raw_map: &str,
    start: Position,
    exit: Position,
    path: &[Position],
    occupied: &HashSet<Position>,
    success: bool,
) -> EvacResult<String> {
    let text = MapText::split(raw_map)?;
    let mut grid: Vec<Vec<char>> = text.rows.iter().map(|row| row.chars().collect()).collect();
    let in_grid = |(x, y): Position| y < text.height && x < text.width;

    for &cell in occupied {
        if in_grid(cell) && cell != start && cell != exit {
            grid[cell.1][cell.0] = OCCUPANT_GLYPH;
        }
    }

    let interior = path.get(1..path.len().saturating_sub(1)).unwrap_or(&[]);
    for &cell in interior {
        if !in_grid(cell) {
            continue;
        }
        if !success && occupied.contains(&cell) {
            break;
        }
        let glyph = &mut grid[cell.1][cell.0];
        if ![WALL_GLYPH, START_GLYPH, EXIT_GLYPH, OCCUPANT_GLYPH].contains(glyph) {
            *glyph = PATH_GLYPH;
        }
    }

    if in_grid(start) {
        grid[start.1][start.0] = START_GLYPH;
    }
    if in_grid(exit) {
        grid[exit.1][exit.0] = EXIT_GLYPH;
    }

    let mut lines: Vec<String> = text.header.iter().map(|line| line.to_string()).collect();
    lines.extend(grid.into_iter().map(|row| row.into_iter().collect::<String>()));
    Ok(lines.join("\n"))
}

pub fn file_name(time: usize, success: bool) -> String {
    let prefix = if success { "path_viz" } else { "BLOCKED_viz" };
    format!("{prefix}_t{time:02}.map")
}

pub fn save(dir: &str, time: usize, success: bool, content: &str) -> EvacResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = FsPath::new(dir).join(file_name(time, success));
    fs::write(&path, content)?;
    Ok(path)
}
