//! Error types shared by every stage of the pipeline.

use thiserror::Error;

use crate::piece::PieceKey;

/// Errors raised while building a lattice, searching it or weighting it.
///
/// An empty solution set is not an error: the partition function of no
/// configurations is simply zero.
#[derive(Debug, Error)]
pub enum LatticeError {
    /// Malformed or out-of-range edge/center address
    #[error("invalid coordinate ({x}, {y}): {reason}")]
    InvalidCoordinate {
        x: usize,
        y: usize,
        reason: &'static str,
    },

    #[error("invalid lattice dimensions {m}x{n}: both must be at least 1")]
    InvalidDimensions { m: usize, n: usize },

    /// Boundary fill that leaves a perimeter edge open or touches an interior edge
    #[error("invalid boundary condition: {0}")]
    InvalidBoundary(String),

    /// Weight lookup on a piece that has no entry in the weight map
    #[error("no weight for piece {0}")]
    UnknownPiece(PieceKey),

    #[error("invalid piece key {0:?}: expected four digits in 0..=2")]
    InvalidPieceKey(String),

    /// Symbolic weight missing from a substitution table
    #[error("no substitution for weight {0:?}")]
    UnknownWeight(String),

    #[error("weight name {0:?} is assigned to more than one piece")]
    DuplicateWeight(String),

    #[error("variable {0:?} has no numeric value")]
    UnboundVariable(String),

    #[error("weight table line {line}: {message}")]
    WeightTable { line: usize, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("invalid model config: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LatticeError>;
