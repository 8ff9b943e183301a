//! Error types
use std::num::ParseFloatError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unable to read project: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unable to parse project: {0}")]
    Json(#[from] serde_json::Error),
    #[error("A layer must have at least one keyframe")]
    NoKeyframes,
    #[error("Multiple keyframes for frame {0}")]
    DuplicateKeyframe(u32),
    #[error("Frames are 1-based, frame 0 is not allowed")]
    FrameZero,
    #[error("No clip with id '{0}'")]
    UnknownClip(String),
    #[error("Clip '{0}' contains an instance of itself via {1:?}")]
    ClipCycle(String, Vec<String>),
    #[error("Clip '{0}' is nested deeper than {1} levels")]
    ClipDepthExceeded(String, usize),
}

/// Why a path command string could not be read
///
/// Only surfaced by [`crate::path::parse_path`]; the hot path treats any of these as "no shape".
#[derive(Debug, Error, PartialEq)]
pub enum PathError {
    #[error("Path is empty")]
    Empty,
    #[error("Path must start with a move, got '{0}'")]
    MustStartWithMove(char),
    #[error("Unexpected token '{0}' at {1}")]
    UnexpectedToken(String, usize),
    #[error("Command '{0}' is missing arguments")]
    MissingArguments(char),
    #[error("Invalid number {0}")]
    InvalidNumber(#[from] ParseFloatError),
}
