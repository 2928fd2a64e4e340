//! Error types shared by the parsers, encoders and decoders

use thiserror::Error;

/// Errors raised while reading puzzles or building formulas
#[derive(Error, Debug)]
pub enum PuzzleError {
    /// Input text or puzzle data violates the expected format
    #[error("malformed input{}: {message}", line.map(|l| format!(" (line {l})")).unwrap_or_default())]
    MalformedInput {
        line: Option<usize>,
        message: String,
    },

    /// A cell's boundary classification disagrees with the edge layout
    #[error("cell ({row}, {col}) classified as {pattern} has no {direction} edge")]
    UnreachablePattern {
        row: usize,
        col: usize,
        pattern: String,
        direction: &'static str,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl PuzzleError {
    /// Malformed input without a line reference
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: None,
            message: message.into(),
        }
    }

    /// Malformed input at a 1-based line number
    pub fn malformed_at(line: usize, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            line: Some(line),
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PuzzleError>;
