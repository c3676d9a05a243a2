//! Ice-type lattice enumeration for Yang-Baxter identity checks.
//!
//! This crate enumerates every configuration of a rectangular lattice whose
//! local pieces are all legal under a fixed boundary condition, and folds
//! them into an exact symbolic partition function. The legal pieces, the
//! weight names and the boundary are configuration, so the same engine can
//! serve other piece vocabularies.

pub mod config;
pub mod error;
pub mod geometry;
pub mod lattice;
pub mod piece;
pub mod propagation;
pub mod solver;
pub mod symbolic;
pub mod weight_table;
pub mod weights;

// Re-export main types
pub use config::ModelConfig;
pub use error::{LatticeError, Result};
pub use geometry::{Dimensions, Position};
pub use lattice::{BoundaryFill, BoundaryOverride, EdgeValue, LatticeState};
pub use piece::{piece_at, state_is_legal, LegalPieces, Piece, PieceKey};
pub use solver::{
    enumerate_solutions, enumerate_solutions_ordered, solve, SearchStats, SearchStrategy,
    SolverConfig, SolverResult,
};
pub use symbolic::{Monomial, Polynomial};
pub use weight_table::WeightTable;
pub use weights::{
    partition_function, partition_term, weight_of, SpecificWeighting, SpecificWeights,
    Substitution, WeightMap, WeightScheme,
};

/// Initial state for `m` columns and `n` rows under `fill`
pub fn initial_state(m: usize, n: usize, fill: &BoundaryFill) -> Result<LatticeState> {
    LatticeState::initial(Dimensions::new(m, n)?, fill)
}
