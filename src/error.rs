use thiserror::Error;

use crate::common::Position;

#[derive(Error, Debug)]
pub enum EvacError {
    #[error("Map parse error: {reason}")]
    Parse { reason: String },

    #[error("Invalid exit {position:?}: {reason}")]
    InvalidExit { position: Position, reason: String },

    #[error("Log line {line}: {reason}")]
    InvalidLog { line: usize, reason: String },

    #[error("No agent paths found in log data")]
    EmptyLog,

    #[error("Marker '{glyph}' not found in map")]
    MissingMarker { glyph: char },

    #[error("Exit {exit:?} is unreachable from {start:?} even without agents")]
    Unreachable { start: Position, exit: Position },

    #[error("Reference search aborted after {expanded} expansions")]
    SearchAborted { expanded: usize },

    #[error("No walkable cell available for {purpose}")]
    NoWalkableCell { purpose: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type EvacResult<T> = Result<T, EvacError>;
