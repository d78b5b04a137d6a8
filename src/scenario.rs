use rand::prelude::*;
use std::fs;
use std::path::{Path as FsPath, PathBuf};
use tracing::info;

use crate::common::Position;
use crate::error::{EvacError, EvacResult};
use crate::map::{GridMap, MapText};

pub const START_GLYPH: char = '!';
pub const EXIT_GLYPH: char = 'X';

/// A map whose grid carries the evacuee start `!` and exit `X` markers.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub raw_map: String,
    pub start: Position,
    pub exit: Position,
}

impl Scenario {
    pub fn load_from_file(path: &str) -> EvacResult<Scenario> {
        let content = fs::read_to_string(path)?;
        Self::from_map_str(&content)
    }

    /// Reads the start and exit markers. When a marker appears on several rows the
    /// lowest row wins; within a row its leftmost occurrence is taken.
    pub fn from_map_str(content: &str) -> EvacResult<Scenario> {
        let text = MapText::split(content)?;
        let start = find_glyph(&text.rows, START_GLYPH)
            .ok_or(EvacError::MissingMarker { glyph: START_GLYPH })?;
        let exit = find_glyph(&text.rows, EXIT_GLYPH)
            .ok_or(EvacError::MissingMarker { glyph: EXIT_GLYPH })?;

        Ok(Scenario {
            raw_map: content.to_string(),
            start,
            exit,
        })
    }

    /// Places an exit on a walkable perimeter cell and a start on any other walkable cell.
    /// Markers already present in the grid are cleared first.
    pub fn place_markers<R: Rng + ?Sized>(content: &str, rng: &mut R) -> EvacResult<Scenario> {
        let map = GridMap::parse(content)?;

        let walkable: Vec<Position> = map.walkable_cells().collect();
        let edge: Vec<Position> = walkable
            .iter()
            .copied()
            .filter(|&(x, y)| map.is_on_perimeter(x, y))
            .collect();

        let exit = *edge.choose(rng).ok_or_else(|| EvacError::NoWalkableCell {
            purpose: "exit on the map perimeter".to_string(),
        })?;
        let start_candidates: Vec<Position> = walkable
            .into_iter()
            .filter(|&position| position != exit)
            .collect();
        let start = *start_candidates
            .choose(rng)
            .ok_or_else(|| EvacError::NoWalkableCell {
                purpose: "start distinct from the exit".to_string(),
            })?;

        let text = MapText::split(content)?;
        let mut lines: Vec<String> = text.header.iter().map(|line| line.to_string()).collect();
        for (y, row) in text.rows.iter().enumerate() {
            let row: String = row
                .chars()
                .enumerate()
                .map(|(x, ch)| match (x, y) {
                    position if position == exit => EXIT_GLYPH,
                    position if position == start => START_GLYPH,
                    _ if ch == START_GLYPH || ch == EXIT_GLYPH => '.',
                    _ => ch,
                })
                .collect();
            lines.push(row);
        }

        info!("Generate markers: start {start:?}, exit {exit:?}");
        Ok(Scenario {
            raw_map: lines.join("\n") + "\n",
            start,
            exit,
        })
    }

    /// Writes `<stem>_exit_person.map` into `output_dir`, creating it when missing.
    pub fn write_to_dir(&self, input_path: &str, output_dir: &str) -> EvacResult<PathBuf> {
        let stem = FsPath::new(input_path)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("map");
        fs::create_dir_all(output_dir)?;
        let output_path = FsPath::new(output_dir).join(format!("{stem}_exit_person.map"));
        fs::write(&output_path, &self.raw_map)?;
        Ok(output_path)
    }
}

fn find_glyph(rows: &[&str], glyph: char) -> Option<Position> {
    rows.iter()
        .enumerate()
        .rev()
        .find_map(|(y, row)| row.chars().position(|ch| ch == glyph).map(|x| (x, y)))
}
