//! Edge values, boundary conditions and the lattice state grid.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::geometry::{Dimensions, Position};

/// Value carried by an edge
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum EdgeValue {
    #[default]
    Unassigned,
    A,
    B,
}

impl EdgeValue {
    /// The two values an edge can be filled with, in search order
    pub const FILLED: [EdgeValue; 2] = [EdgeValue::A, EdgeValue::B];

    pub fn is_filled(self) -> bool {
        self != EdgeValue::Unassigned
    }

    /// Digit used in piece keys and weight tables
    pub fn digit(self) -> u8 {
        match self {
            EdgeValue::Unassigned => 0,
            EdgeValue::A => 2,
            EdgeValue::B => 1,
        }
    }

    pub fn from_digit(digit: u8) -> Option<EdgeValue> {
        match digit {
            0 => Some(EdgeValue::Unassigned),
            1 => Some(EdgeValue::B),
            2 => Some(EdgeValue::A),
            _ => None,
        }
    }

    pub fn glyph(self) -> char {
        match self {
            EdgeValue::Unassigned => '?',
            EdgeValue::A => '+',
            EdgeValue::B => '-',
        }
    }

    pub fn flipped(self) -> EdgeValue {
        match self {
            EdgeValue::A => EdgeValue::B,
            EdgeValue::B => EdgeValue::A,
            EdgeValue::Unassigned => EdgeValue::Unassigned,
        }
    }
}

/// A single boundary edge pinned to a non-default value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryOverride {
    pub x: usize,
    pub y: usize,
    pub value: EdgeValue,
}

/// Values imposed on the perimeter before the search starts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundaryFill {
    pub default: EdgeValue,
    #[serde(default)]
    pub overrides: Vec<BoundaryOverride>,
}

impl BoundaryFill {
    /// Every boundary edge `A` except the top-left and bottom-right seeds
    pub fn canonical(dims: Dimensions) -> Self {
        let (m, n) = (dims.columns(), dims.rows());
        Self {
            default: EdgeValue::A,
            overrides: vec![
                BoundaryOverride {
                    x: 1,
                    y: 2 * n,
                    value: EdgeValue::B,
                },
                BoundaryOverride {
                    x: 2 * m - 1,
                    y: 0,
                    value: EdgeValue::B,
                },
            ],
        }
    }

    pub fn uniform(value: EdgeValue) -> Self {
        Self {
            default: value,
            overrides: Vec::new(),
        }
    }

    pub fn with_override(mut self, pos: Position, value: EdgeValue) -> Self {
        self.overrides.push(BoundaryOverride {
            x: pos.x,
            y: pos.y,
            value,
        });
        self
    }
}

/// Values of every edge of the grid.
///
/// Cells that are not edges stay `Unassigned` and are never read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LatticeState {
    dims: Dimensions,
    cells: Vec<EdgeValue>,
}

impl LatticeState {
    /// A grid with every edge unassigned
    pub fn empty(dims: Dimensions) -> Self {
        Self {
            dims,
            cells: vec![EdgeValue::Unassigned; dims.width() * dims.height()],
        }
    }

    /// Construction entry point: fill the perimeter, leave the interior open
    pub fn initial(dims: Dimensions, fill: &BoundaryFill) -> Result<Self> {
        if !fill.default.is_filled() {
            return Err(LatticeError::InvalidBoundary(
                "default boundary value must be A or B".to_string(),
            ));
        }

        let mut state = Self::empty(dims);
        for pos in dims.boundary_positions() {
            let idx = state.index(pos);
            state.cells[idx] = fill.default;
        }

        for o in &fill.overrides {
            let pos = Position::new(o.x, o.y);
            if !dims.is_boundary(pos)? {
                return Err(LatticeError::InvalidCoordinate {
                    x: pos.x,
                    y: pos.y,
                    reason: "boundary override on an interior edge",
                });
            }
            if !o.value.is_filled() {
                return Err(LatticeError::InvalidBoundary(format!(
                    "override at ({}, {}) leaves the edge unassigned",
                    pos.x, pos.y
                )));
            }
            let idx = state.index(pos);
            state.cells[idx] = o.value;
        }

        Ok(state)
    }

    pub fn dims(&self) -> Dimensions {
        self.dims
    }

    fn index(&self, pos: Position) -> usize {
        pos.y * self.dims.width() + pos.x
    }

    pub fn get(&self, pos: Position) -> Result<EdgeValue> {
        self.dims.check_edge(pos)?;
        Ok(self.cells[self.index(pos)])
    }

    pub fn set(&mut self, pos: Position, value: EdgeValue) -> Result<()> {
        self.dims.check_edge(pos)?;
        let idx = self.index(pos);
        self.cells[idx] = value;
        Ok(())
    }

    /// Clone with one edge changed
    pub fn with_value(&self, pos: Position, value: EdgeValue) -> Result<Self> {
        let mut next = self.clone();
        next.set(pos, value)?;
        Ok(next)
    }

    /// Read without the edge check, for positions produced by [`Dimensions`]
    pub(crate) fn value(&self, pos: Position) -> EdgeValue {
        self.cells[self.index(pos)]
    }

    /// Write without the edge check, for positions produced by [`Dimensions`]
    pub(crate) fn assign(&mut self, pos: Position, value: EdgeValue) {
        let idx = self.index(pos);
        self.cells[idx] = value;
    }

    /// Unassigned edges, `x` outermost
    pub fn unassigned_positions(&self) -> Vec<Position> {
        self.dims
            .edge_positions()
            .filter(|&pos| !self.value(pos).is_filled())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.dims.edge_positions().all(|pos| self.value(pos).is_filled())
    }

    /// Every perimeter edge is filled
    pub fn boundary_is_filled(&self) -> bool {
        self.dims
            .boundary_positions()
            .into_iter()
            .all(|pos| self.value(pos).is_filled())
    }
}

impl fmt::Display for LatticeState {
    /// Top row first; centers drawn as `o`, filler as a blank
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.dims.height()).rev() {
            let mut line = String::with_capacity(self.dims.width());
            for x in 0..self.dims.width() {
                let c = match (x % 2, y % 2) {
                    (0, 0) => ' ',
                    (1, 1) => 'o',
                    _ => self.value(Position::new(x, y)).glyph(),
                };
                line.push(c);
            }
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
