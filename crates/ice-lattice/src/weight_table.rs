//! Numeric weight tables stored as `<piece key>,<value>` lines.

use std::collections::BTreeMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use crate::error::{LatticeError, Result};
use crate::lattice::LatticeState;
use crate::piece::{piece_at, Piece, PieceKey};
use crate::weights::WeightMap;

/// Floating-point weight per piece
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightTable {
    values: BTreeMap<PieceKey, f64>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: PieceKey, value: f64) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &PieceKey) -> Option<f64> {
        self.values.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parse table text; blank lines are skipped, there is no header
    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (idx, line) in text.lines().enumerate() {
            table.parse_line(idx + 1, line)?;
        }
        Ok(table)
    }

    pub fn read(reader: impl BufRead) -> Result<Self> {
        let mut table = Self::new();
        for (idx, line) in reader.lines().enumerate() {
            table.parse_line(idx + 1, &line?)?;
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self> {
        Self::parse(&fs::read_to_string(path)?)
    }

    fn parse_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let bad = |message: String| LatticeError::WeightTable {
            line: line_no,
            message,
        };
        let (key, value) = line
            .split_once(',')
            .ok_or_else(|| bad("expected <key>,<value>".to_string()))?;
        let key: PieceKey = key
            .trim()
            .parse()
            .map_err(|_| bad(format!("invalid piece key {:?}", key.trim())))?;
        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| bad(format!("invalid number {:?}", value.trim())))?;
        self.values.insert(key, value);
        Ok(())
    }

    /// One line per key in key order; values use shortest round-trip formatting
    pub fn write(&self, mut writer: impl Write) -> Result<()> {
        for (key, value) in &self.values {
            writeln!(writer, "{},{:?}", key, value)?;
        }
        Ok(())
    }

    pub fn to_table_string(&self) -> String {
        self.values
            .iter()
            .map(|(key, value)| format!("{},{:?}\n", key, value))
            .collect()
    }

    pub fn weight(&self, piece: &Piece) -> Result<f64> {
        self.get(&piece.key())
            .ok_or(LatticeError::UnknownPiece(piece.key()))
    }

    /// Sum over `solutions` of the product of their piece values
    pub fn numeric_partition_function(&self, solutions: &[LatticeState]) -> Result<f64> {
        let mut total = 0.0;
        for state in solutions {
            let mut term = 1.0;
            for (_, _, center) in state.dims().centers() {
                term *= self.weight(&piece_at(state, center)?)?;
            }
            total += term;
        }
        Ok(total)
    }

    /// Symbol name to value, for evaluating a symbolic partition function
    pub fn bindings(&self, map: &WeightMap) -> BTreeMap<String, f64> {
        map.iter()
            .filter_map(|(piece, name)| self.get(&piece.key()).map(|v| (name.to_string(), v)))
            .collect()
    }
}
