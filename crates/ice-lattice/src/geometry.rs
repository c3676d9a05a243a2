//! Addressing of the `(2m+1) x (2n+1)` embedding grid.
//!
//! A lattice with `m` columns and `n` rows of sites is embedded in a grid
//! where parity decides the role of each cell:
//! - both coordinates even: unused filler
//! - both odd: a center, one per site `(i, j)` at `(2i+1, 2j+1)`
//! - exactly one odd: an edge, the only cell that carries a value
//!
//! `y` grows upwards, so `y == 0` is the bottom row of the grid.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::{LatticeError, Result};

/// Cell address on the embedding grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }

    /// Grid position of the site `(i, j)`
    pub fn center(i: usize, j: usize) -> Self {
        Self {
            x: 2 * i + 1,
            y: 2 * j + 1,
        }
    }

    fn invalid(self, reason: &'static str) -> LatticeError {
        LatticeError::InvalidCoordinate {
            x: self.x,
            y: self.y,
            reason,
        }
    }
}

/// Validated lattice size: `m` columns and `n` rows of centers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    m: usize,
    n: usize,
}

impl Dimensions {
    pub fn new(m: usize, n: usize) -> Result<Self> {
        if m < 1 || n < 1 {
            return Err(LatticeError::InvalidDimensions { m, n });
        }
        Ok(Self { m, n })
    }

    pub fn columns(&self) -> usize {
        self.m
    }

    pub fn rows(&self) -> usize {
        self.n
    }

    /// Grid width, `2m + 1`
    pub fn width(&self) -> usize {
        2 * self.m + 1
    }

    /// Grid height, `2n + 1`
    pub fn height(&self) -> usize {
        2 * self.n + 1
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width() && pos.y < self.height()
    }

    pub fn is_edge(&self, pos: Position) -> bool {
        self.contains(pos) && (pos.x + pos.y) % 2 == 1
    }

    pub fn is_center(&self, pos: Position) -> bool {
        self.contains(pos) && pos.x % 2 == 1 && pos.y % 2 == 1
    }

    /// Fail with `InvalidCoordinate` unless `pos` is an edge of this grid
    pub fn check_edge(&self, pos: Position) -> Result<()> {
        if !self.contains(pos) {
            return Err(pos.invalid("outside the grid"));
        }
        if (pos.x + pos.y) % 2 == 0 {
            return Err(pos.invalid("not an edge (coordinates share parity)"));
        }
        Ok(())
    }

    /// Fail with `InvalidCoordinate` unless `pos` is a center of this grid
    pub fn check_center(&self, pos: Position) -> Result<()> {
        if !self.contains(pos) {
            return Err(pos.invalid("outside the grid"));
        }
        if pos.x % 2 == 0 || pos.y % 2 == 0 {
            return Err(pos.invalid("not a center (coordinates must both be odd)"));
        }
        Ok(())
    }

    /// Perimeter edges in four runs: bottom, left, top, right
    pub fn boundary_positions(&self) -> Vec<Position> {
        let (m, n) = (self.m, self.n);
        let mut positions = Vec::with_capacity(2 * (m + n));
        positions.extend((0..m).map(|i| Position::new(2 * i + 1, 0)));
        positions.extend((0..n).map(|j| Position::new(0, 2 * j + 1)));
        positions.extend((0..m).map(|i| Position::new(2 * i + 1, 2 * n)));
        positions.extend((0..n).map(|j| Position::new(2 * m, 2 * j + 1)));
        positions
    }

    pub fn is_boundary(&self, pos: Position) -> Result<bool> {
        self.check_edge(pos)?;
        Ok(pos.x == 0 || pos.x == 2 * self.m || pos.y == 0 || pos.y == 2 * self.n)
    }

    /// The one center next to a boundary edge, or the two an interior edge separates
    pub fn neighbor_centers(&self, pos: Position) -> Result<SmallVec<[Position; 2]>> {
        self.check_edge(pos)?;
        let Position { x, y } = pos;
        let mut centers = SmallVec::new();
        if x == 0 {
            centers.push(Position::new(x + 1, y));
        } else if x == 2 * self.m {
            centers.push(Position::new(x - 1, y));
        } else if y == 0 {
            centers.push(Position::new(x, y + 1));
        } else if y == 2 * self.n {
            centers.push(Position::new(x, y - 1));
        } else if y % 2 == 0 {
            // horizontal segment between a center below and one above
            centers.push(Position::new(x, y - 1));
            centers.push(Position::new(x, y + 1));
        } else {
            centers.push(Position::new(x - 1, y));
            centers.push(Position::new(x + 1, y));
        }
        Ok(centers)
    }

    /// The edges around a center in `(up, left, right, down)` order.
    ///
    /// Piece reading and weight lookup both rely on this order.
    pub fn center_to_edges(&self, center: Position) -> Result<[Position; 4]> {
        self.check_center(center)?;
        let Position { x, y } = center;
        Ok([
            Position::new(x, y + 1),
            Position::new(x - 1, y),
            Position::new(x + 1, y),
            Position::new(x, y - 1),
        ])
    }

    /// Every edge sharing a center with `pos`, excluding `pos`.
    ///
    /// Three for a boundary edge, six for an interior one.
    pub fn edge_neighbors(&self, pos: Position) -> Result<SmallVec<[Position; 6]>> {
        let mut neighbors = SmallVec::new();
        for center in self.neighbor_centers(pos)? {
            for edge in self.center_to_edges(center)? {
                if edge != pos {
                    neighbors.push(edge);
                }
            }
        }
        Ok(neighbors)
    }

    /// Sites as `(i, j, center)`, `i` outermost
    pub fn centers(&self) -> impl Iterator<Item = (usize, usize, Position)> + '_ {
        (0..self.m).flat_map(move |i| (0..self.n).map(move |j| (i, j, Position::center(i, j))))
    }

    /// All edge positions, `x` outermost
    pub fn edge_positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.width()).flat_map(move |x| {
            (0..self.height())
                .filter(move |y| (x + y) % 2 == 1)
                .map(move |y| Position::new(x, y))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_dimensions() {
        assert!(matches!(
            Dimensions::new(0, 3),
            Err(LatticeError::InvalidDimensions { m: 0, n: 3 })
        ));
        assert!(Dimensions::new(2, 0).is_err());
        assert!(Dimensions::new(1, 1).is_ok());
    }

    #[test]
    fn test_boundary_positions() {
        let dims = Dimensions::new(2, 1).unwrap();
        let boundary = dims.boundary_positions();
        assert_eq!(
            boundary,
            vec![
                Position::new(1, 0),
                Position::new(3, 0),
                Position::new(0, 1),
                Position::new(1, 2),
                Position::new(3, 2),
                Position::new(4, 1),
            ]
        );
        for pos in boundary {
            assert!(dims.is_boundary(pos).unwrap());
        }
        assert!(!dims.is_boundary(Position::new(2, 1)).unwrap());
    }

    #[test]
    fn test_invalid_coordinates() {
        let dims = Dimensions::new(2, 2).unwrap();
        // center, filler, out of range
        for pos in [Position::new(1, 1), Position::new(2, 2), Position::new(5, 2)] {
            assert!(matches!(
                dims.neighbor_centers(pos),
                Err(LatticeError::InvalidCoordinate { .. })
            ));
            assert!(dims.is_boundary(pos).is_err());
            assert!(dims.edge_neighbors(pos).is_err());
        }
        assert!(dims.center_to_edges(Position::new(2, 1)).is_err());
    }

    #[test]
    fn test_neighbor_centers() {
        let dims = Dimensions::new(2, 2).unwrap();
        assert_eq!(
            dims.neighbor_centers(Position::new(0, 3)).unwrap().as_slice(),
            &[Position::new(1, 3)]
        );
        assert_eq!(
            dims.neighbor_centers(Position::new(3, 4)).unwrap().as_slice(),
            &[Position::new(3, 3)]
        );
        assert_eq!(
            dims.neighbor_centers(Position::new(1, 2)).unwrap().as_slice(),
            &[Position::new(1, 1), Position::new(1, 3)]
        );
        assert_eq!(
            dims.neighbor_centers(Position::new(2, 3)).unwrap().as_slice(),
            &[Position::new(1, 3), Position::new(3, 3)]
        );
    }

    #[test]
    fn test_center_to_edges_order() {
        let dims = Dimensions::new(1, 1).unwrap();
        assert_eq!(
            dims.center_to_edges(Position::new(1, 1)).unwrap(),
            [
                Position::new(1, 2),
                Position::new(0, 1),
                Position::new(2, 1),
                Position::new(1, 0),
            ]
        );
    }

    #[test]
    fn test_edge_neighbors() {
        let dims = Dimensions::new(2, 2).unwrap();
        let boundary = dims.edge_neighbors(Position::new(1, 0)).unwrap();
        assert_eq!(boundary.len(), 3);
        assert!(!boundary.contains(&Position::new(1, 0)));

        let interior = dims.edge_neighbors(Position::new(2, 1)).unwrap();
        assert_eq!(interior.len(), 6);
        assert!(!interior.contains(&Position::new(2, 1)));
        assert!(interior.contains(&Position::new(0, 1)));
        assert!(interior.contains(&Position::new(4, 1)));
    }

    #[test]
    fn test_edge_count() {
        let dims = Dimensions::new(3, 2).unwrap();
        // m(n+1) horizontal + n(m+1) vertical
        assert_eq!(dims.edge_positions().count(), 3 * 3 + 2 * 4);
        assert!(dims.edge_positions().all(|p| dims.is_edge(p)));
        assert_eq!(dims.centers().count(), 6);
    }
}
