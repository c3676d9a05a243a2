//! Local configurations around a center and the rule deciding their legality.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::geometry::Position;
use crate::lattice::{EdgeValue, LatticeState};

/// The four edge values around one center, read `(up, left, right, down)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Piece {
    pub up: EdgeValue,
    pub left: EdgeValue,
    pub right: EdgeValue,
    pub down: EdgeValue,
}

impl Piece {
    pub fn new(up: EdgeValue, left: EdgeValue, right: EdgeValue, down: EdgeValue) -> Self {
        Self {
            up,
            left,
            right,
            down,
        }
    }

    pub fn from_array([up, left, right, down]: [EdgeValue; 4]) -> Self {
        Self::new(up, left, right, down)
    }

    pub fn as_array(&self) -> [EdgeValue; 4] {
        [self.up, self.left, self.right, self.down]
    }

    pub fn key(&self) -> PieceKey {
        PieceKey(self.as_array().map(EdgeValue::digit))
    }

    pub fn from_key(key: &PieceKey) -> Self {
        // digits are validated when the key is built
        Self::from_array(key.0.map(|d| EdgeValue::from_digit(d).unwrap_or_default()))
    }

    /// Every edge carries a value
    pub fn is_filled(&self) -> bool {
        self.as_array().iter().all(|v| v.is_filled())
    }

    /// True if `self` agrees with `partial` on every filled edge of `partial`
    pub fn matches(&self, partial: &Piece) -> bool {
        self.as_array()
            .iter()
            .zip(partial.as_array().iter())
            .all(|(full, part)| !part.is_filled() || full == part)
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for v in self.as_array() {
            write!(f, "{}", v.glyph())?;
        }
        Ok(())
    }
}

/// Four-digit key of a piece, e.g. `"1221"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PieceKey([u8; 4]);

impl PieceKey {
    pub fn digits(&self) -> [u8; 4] {
        self.0
    }
}

impl FromStr for PieceKey {
    type Err = LatticeError;

    /// Keeps only the ASCII digits, so decorated names like `b_{1221}` parse
    fn from_str(s: &str) -> Result<Self> {
        let digits: Vec<u8> = s
            .bytes()
            .filter(u8::is_ascii_digit)
            .map(|b| b - b'0')
            .collect();
        match digits.as_slice() {
            &[a, b, c, d] if digits.iter().all(|&x| x <= 2) => Ok(PieceKey([a, b, c, d])),
            _ => Err(LatticeError::InvalidPieceKey(s.to_string())),
        }
    }
}

impl TryFrom<String> for PieceKey {
    type Error = LatticeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<PieceKey> for String {
    fn from(key: PieceKey) -> String {
        key.to_string()
    }
}

impl fmt::Display for PieceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for d in self.0 {
            write!(f, "{}", d)?;
        }
        Ok(())
    }
}

/// The finite vocabulary of admissible pieces
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegalPieces(BTreeSet<Piece>);

impl LegalPieces {
    pub fn new(pieces: impl IntoIterator<Item = Piece>) -> Self {
        Self(pieces.into_iter().collect())
    }

    /// The six ice-rule pieces: both homogeneous pieces plus the four with two of each value
    pub fn six_vertex() -> Self {
        use crate::lattice::EdgeValue::{A, B};
        Self::new([
            Piece::new(A, A, A, A),
            Piece::new(B, B, B, B),
            Piece::new(B, A, A, B),
            Piece::new(A, B, B, A),
            Piece::new(A, B, A, B),
            Piece::new(B, A, B, A),
        ])
    }

    pub fn is_legal(&self, piece: &Piece) -> bool {
        self.0.contains(piece)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Piece> {
        self.0.iter()
    }

    /// Legal pieces consistent with the filled edges of `partial`
    pub fn completions<'a>(&'a self, partial: &'a Piece) -> impl Iterator<Item = &'a Piece> + 'a {
        self.0.iter().filter(move |p| p.matches(partial))
    }
}

impl FromIterator<Piece> for LegalPieces {
    fn from_iter<I: IntoIterator<Item = Piece>>(iter: I) -> Self {
        Self::new(iter)
    }
}

/// Read the piece around `center`
pub fn piece_at(state: &LatticeState, center: Position) -> Result<Piece> {
    let edges = state.dims().center_to_edges(center)?;
    Ok(Piece::from_array(edges.map(|pos| state.value(pos))))
}

/// Every center of `state` holds a legal piece.
///
/// Stops at the first violation; unassigned edges make a piece illegal.
pub fn state_is_legal(state: &LatticeState, legal: &LegalPieces) -> bool {
    state
        .dims()
        .centers()
        .all(|(_, _, center)| piece_at(state, center).map_or(false, |piece| legal.is_legal(&piece)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;
    use crate::lattice::BoundaryFill;
    use crate::lattice::EdgeValue::{A, B, Unassigned};

    #[test]
    fn test_piece_key_format() {
        let piece = Piece::new(B, A, A, B);
        assert_eq!(piece.key().to_string(), "1221");
        assert_eq!(Piece::from_key(&"1221".parse().unwrap()), piece);
    }

    #[test]
    fn test_piece_key_parsing() {
        assert_eq!("b_{2112}".parse::<PieceKey>().unwrap().digits(), [2, 1, 1, 2]);
        assert!("123".parse::<PieceKey>().is_err());
        assert!("12345".parse::<PieceKey>().is_err());
        assert!(matches!(
            "1231".parse::<PieceKey>(),
            Err(LatticeError::InvalidPieceKey(_))
        ));
    }

    #[test]
    fn test_six_vertex_membership() {
        let legal = LegalPieces::six_vertex();
        assert_eq!(legal.len(), 6);
        assert!(legal.is_legal(&Piece::new(A, A, A, A)));
        assert!(legal.is_legal(&Piece::new(A, B, A, B)));
        assert!(!legal.is_legal(&Piece::new(A, A, A, B)));
        assert!(!legal.is_legal(&Piece::new(A, A, B, B)));
        assert!(!legal.is_legal(&Piece::new(A, A, A, Unassigned)));
    }

    #[test]
    fn test_completions() {
        let legal = LegalPieces::six_vertex();
        let partial = Piece::new(A, B, A, Unassigned);
        let found: Vec<_> = legal.completions(&partial).copied().collect();
        assert_eq!(found, vec![Piece::new(A, B, A, B)]);

        let open = Piece::new(A, Unassigned, Unassigned, Unassigned);
        assert_eq!(legal.completions(&open).count(), 3);
    }

    #[test]
    fn test_state_is_legal_single_site() {
        let dims = Dimensions::new(1, 1).unwrap();
        let state = LatticeState::initial(dims, &BoundaryFill::canonical(dims)).unwrap();
        let legal = LegalPieces::six_vertex();

        assert_eq!(piece_at(&state, Position::new(1, 1)).unwrap(), Piece::new(B, A, A, B));
        assert!(state_is_legal(&state, &legal));
        assert!(state_is_legal(&state, &legal));
        assert!(piece_at(&state, Position::new(0, 1)).is_err());
    }

    #[test]
    fn test_incomplete_state_is_not_legal() {
        let dims = Dimensions::new(2, 1).unwrap();
        let state = LatticeState::initial(dims, &BoundaryFill::canonical(dims)).unwrap();
        assert!(!state_is_legal(&state, &LegalPieces::six_vertex()));
    }

    #[test]
    fn test_state_is_legal_checks_every_site() {
        let dims = Dimensions::new(2, 1).unwrap();
        let state = LatticeState::initial(dims, &BoundaryFill::canonical(dims)).unwrap();
        let legal = LegalPieces::six_vertex();

        let forced = state.with_value(Position::new(2, 1), B).unwrap();
        assert!(state_is_legal(&forced, &legal));
        // A on the shared edge breaks both sites
        let wrong = state.with_value(Position::new(2, 1), A).unwrap();
        assert!(!state_is_legal(&wrong, &legal));
        assert!(!state_is_legal(&forced, &LegalPieces::new([Piece::new(A, A, A, A)])));
    }
}
