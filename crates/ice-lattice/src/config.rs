//! Model configuration loaded from JSON.
//!
//! ```json
//! {
//!   "weights": {"2222": "a1", "1111": "a2", "1221": "b1", "2112": "b2", "2121": "c1", "1212": "c2"},
//!   "specificWeights": {"a1": 1, "a2": 0, "b1": 1, "b2": "z", "c1": "z", "c2": 1},
//!   "boundary": {"default": "A", "overrides": [{"x": 1, "y": 6, "value": "B"}]}
//! }
//! ```
//!
//! Every field is optional. The legal pieces are the keys of `weights`.
//!
//! A specific weight is an integer, a decimal such as `0.5` or `"-1.25"`, a
//! `"p/q"` fraction, the column marker `"z"`, or any other name, which stays
//! symbolic. Decimals are read exactly from their written digits, so `0.1`
//! is `1/10`; exponent notation is not accepted in strings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::Dimensions;
use crate::lattice::BoundaryFill;
use crate::piece::LegalPieces;
use crate::weights::{SpecificWeights, WeightMap};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfig {
    #[serde(default)]
    pub weights: WeightMap,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_weights: Option<SpecificWeights>,
    /// Canonical two-seed boundary when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boundary: Option<BoundaryFill>,
}

impl ModelConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    pub fn legal_pieces(&self) -> LegalPieces {
        self.weights.legal_pieces()
    }

    pub fn boundary_fill(&self, dims: Dimensions) -> BoundaryFill {
        self.boundary
            .clone()
            .unwrap_or_else(|| BoundaryFill::canonical(dims))
    }

    /// Configured substitutions, or the six-vertex defaults
    pub fn specific_weights(&self) -> SpecificWeights {
        self.specific_weights
            .clone()
            .unwrap_or_else(SpecificWeights::six_vertex)
    }
}
