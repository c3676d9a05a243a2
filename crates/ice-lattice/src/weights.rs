//! Weight assignment and partition-function accumulation.
//!
//! A [`WeightScheme`] maps the piece at site `(i, j)` to a polynomial. The
//! partition function is the sum, over accepted states, of the product of
//! the weights of all their pieces.

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};

use crate::error::{LatticeError, Result};
use crate::lattice::LatticeState;
use crate::piece::{piece_at, LegalPieces, Piece, PieceKey};
use crate::symbolic::Polynomial;

/// Reserved substitution that stands for a per-column free variable
pub const COLUMN_MARKER: &str = "z";

/// Source of the weight contributed by one piece
pub trait WeightScheme {
    /// Weight of `piece` sitting at site `(i, j)`
    fn weight(&self, piece: &Piece, i: usize, j: usize) -> Result<Polynomial>;
}

/// Injective mapping from pieces to symbolic weight names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<PieceKey, String>", into = "BTreeMap<PieceKey, String>")]
pub struct WeightMap {
    symbols: BTreeMap<Piece, String>,
}

impl WeightMap {
    pub fn new() -> Self {
        Self {
            symbols: BTreeMap::new(),
        }
    }

    /// `a`, `b` and `c` families of the six-vertex model
    pub fn six_vertex() -> Self {
        use crate::lattice::EdgeValue::{A, B};
        let symbols = [
            (Piece::new(A, A, A, A), "a1"),
            (Piece::new(B, B, B, B), "a2"),
            (Piece::new(B, A, A, B), "b1"),
            (Piece::new(A, B, B, A), "b2"),
            (Piece::new(A, B, A, B), "c1"),
            (Piece::new(B, A, B, A), "c2"),
        ];
        Self {
            symbols: symbols
                .into_iter()
                .map(|(piece, name)| (piece, name.to_string()))
                .collect(),
        }
    }

    pub fn from_keys<K, S>(entries: impl IntoIterator<Item = (K, S)>) -> Result<Self>
    where
        K: AsRef<str>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for (key, name) in entries {
            let key: PieceKey = key.as_ref().parse()?;
            map.insert(Piece::from_key(&key), name)?;
        }
        Ok(map)
    }

    /// Add or replace the weight of `piece`; rejects a name already used by another piece
    pub fn insert(&mut self, piece: Piece, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self
            .symbols
            .iter()
            .any(|(other, existing)| *other != piece && *existing == name)
        {
            return Err(LatticeError::DuplicateWeight(name));
        }
        self.symbols.insert(piece, name);
        Ok(())
    }

    pub fn symbol(&self, piece: &Piece) -> Option<&str> {
        self.symbols.get(piece).map(String::as_str)
    }

    pub fn piece_for(&self, name: &str) -> Option<Piece> {
        self.symbols
            .iter()
            .find(|(_, symbol)| symbol.as_str() == name)
            .map(|(piece, _)| *piece)
    }

    /// The pieces that carry a weight
    pub fn legal_pieces(&self) -> LegalPieces {
        self.symbols.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Piece, &str)> {
        self.symbols.iter().map(|(piece, name)| (piece, name.as_str()))
    }
}

impl Default for WeightMap {
    fn default() -> Self {
        Self::six_vertex()
    }
}

impl TryFrom<BTreeMap<PieceKey, String>> for WeightMap {
    type Error = LatticeError;

    fn try_from(entries: BTreeMap<PieceKey, String>) -> Result<Self> {
        let mut map = Self::new();
        for (key, name) in entries {
            map.insert(Piece::from_key(&key), name)?;
        }
        Ok(map)
    }
}

impl From<WeightMap> for BTreeMap<PieceKey, String> {
    fn from(map: WeightMap) -> Self {
        map.symbols
            .into_iter()
            .map(|(piece, name)| (piece.key(), name))
            .collect()
    }
}

impl WeightScheme for WeightMap {
    fn weight(&self, piece: &Piece, _i: usize, _j: usize) -> Result<Polynomial> {
        weight_of(piece, self)
    }
}

/// Concrete value substituted for one symbolic weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSubstitution", into = "RawSubstitution")]
pub enum Substitution {
    Constant(BigRational),
    Symbol(String),
    /// The free variable of the center's column, `z{j+1}`
    Column,
}

impl Substitution {
    pub fn integer(c: i64) -> Self {
        Substitution::Constant(BigRational::from_integer(BigInt::from(c)))
    }

    fn resolve(&self, prefix: &str, j: usize) -> Polynomial {
        match self {
            Substitution::Constant(c) => Polynomial::constant(c.clone()),
            Substitution::Symbol(name) => Polynomial::variable(name.clone()),
            Substitution::Column => Polynomial::variable(format!("{}{}", prefix, j + 1)),
        }
    }
}

/// JSON form: an integer, a decimal number, a `"p/q"` or digit string, the
/// column marker, or a symbol name
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawSubstitution {
    Integer(i64),
    Float(f64),
    Text(String),
}

/// `"-1.25"` as the exact rational `-5/4`; no exponent notation
fn parse_decimal(text: &str) -> Option<BigRational> {
    let (whole, frac) = text.split_once('.')?;
    if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits: BigInt = format!("{}{}", whole, frac).parse().ok()?;
    let scale = num_traits::pow(BigInt::from(10), frac.len());
    Some(BigRational::new(digits, scale))
}

fn parse_constant(text: &str) -> std::result::Result<Option<BigRational>, String> {
    if let Some((p, q)) = text.split_once('/') {
        let p: BigInt = p.trim().parse().map_err(|_| format!("bad numerator in {:?}", text))?;
        let q: BigInt = q.trim().parse().map_err(|_| format!("bad denominator in {:?}", text))?;
        if q.is_zero() {
            return Err(format!("zero denominator in {:?}", text));
        }
        return Ok(Some(BigRational::new(p, q)));
    }
    if text.contains('.') {
        return parse_decimal(text.trim())
            .map(Some)
            .ok_or_else(|| format!("bad decimal {:?}", text));
    }
    Ok(text.parse::<BigInt>().ok().map(BigRational::from_integer))
}

impl TryFrom<RawSubstitution> for Substitution {
    type Error = String;

    fn try_from(raw: RawSubstitution) -> std::result::Result<Self, String> {
        match raw {
            RawSubstitution::Integer(c) => Ok(Substitution::integer(c)),
            // shortest round-trip text, so 0.1 reads as 1/10
            RawSubstitution::Float(v) => parse_constant(&v.to_string())?
                .map(Substitution::Constant)
                .ok_or_else(|| format!("unsupported number {}", v)),
            RawSubstitution::Text(text) if text == COLUMN_MARKER => Ok(Substitution::Column),
            RawSubstitution::Text(text) => match parse_constant(&text)? {
                Some(c) => Ok(Substitution::Constant(c)),
                None => Ok(Substitution::Symbol(text)),
            },
        }
    }
}

impl From<Substitution> for RawSubstitution {
    fn from(sub: Substitution) -> Self {
        match sub {
            Substitution::Constant(c) if c.is_integer() => match c.numer().to_i64() {
                Some(n) => RawSubstitution::Integer(n),
                None => RawSubstitution::Text(c.numer().to_string()),
            },
            Substitution::Constant(c) => RawSubstitution::Text(format!("{}/{}", c.numer(), c.denom())),
            Substitution::Symbol(name) => RawSubstitution::Text(name),
            Substitution::Column => RawSubstitution::Text(COLUMN_MARKER.to_string()),
        }
    }
}

/// Substitution table from weight names to concrete values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpecificWeights {
    values: BTreeMap<String, Substitution>,
}

impl SpecificWeights {
    pub fn new(values: BTreeMap<String, Substitution>) -> Self {
        Self { values }
    }

    /// `a1 = b1 = c2 = 1`, `a2 = 0`, `b2 = c1 = z{j+1}`
    pub fn six_vertex() -> Self {
        let one = || Substitution::Constant(BigRational::one());
        Self::new(BTreeMap::from([
            ("a1".to_string(), one()),
            ("a2".to_string(), Substitution::Constant(BigRational::zero())),
            ("b1".to_string(), one()),
            ("b2".to_string(), Substitution::Column),
            ("c1".to_string(), Substitution::Column),
            ("c2".to_string(), one()),
        ]))
    }

    pub fn get(&self, name: &str) -> Option<&Substitution> {
        self.values.get(name)
    }
}

/// Weight map followed by a site-dependent substitution
#[derive(Debug, Clone, Copy)]
pub struct SpecificWeighting<'a> {
    pub map: &'a WeightMap,
    pub values: &'a SpecificWeights,
}

impl<'a> SpecificWeighting<'a> {
    pub fn new(map: &'a WeightMap, values: &'a SpecificWeights) -> Self {
        Self { map, values }
    }
}

impl WeightScheme for SpecificWeighting<'_> {
    fn weight(&self, piece: &Piece, _i: usize, j: usize) -> Result<Polynomial> {
        let name = self
            .map
            .symbol(piece)
            .ok_or(LatticeError::UnknownPiece(piece.key()))?;
        let sub = self
            .values
            .get(name)
            .ok_or_else(|| LatticeError::UnknownWeight(name.to_string()))?;
        Ok(sub.resolve(COLUMN_MARKER, j))
    }
}

/// Symbolic weight of a piece already known to be legal
pub fn weight_of(piece: &Piece, map: &WeightMap) -> Result<Polynomial> {
    map.symbol(piece)
        .map(Polynomial::variable)
        .ok_or(LatticeError::UnknownPiece(piece.key()))
}

/// Product of the weights of every piece of `state`
pub fn partition_term<W: WeightScheme + ?Sized>(state: &LatticeState, scheme: &W) -> Result<Polynomial> {
    let mut term = Polynomial::one();
    for (i, j, center) in state.dims().centers() {
        let piece = piece_at(state, center)?;
        term *= &scheme.weight(&piece, i, j)?;
    }
    Ok(term)
}

/// Sum of [`partition_term`] over `solutions`; zero when there are none
pub fn partition_function<W: WeightScheme + ?Sized>(
    solutions: &[LatticeState],
    scheme: &W,
) -> Result<Polynomial> {
    let mut total = Polynomial::zero();
    for state in solutions {
        total += partition_term(state, scheme)?;
    }
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Dimensions;
    use crate::lattice::BoundaryFill;
    use crate::lattice::EdgeValue::{A, B};

    fn ratio(p: i64, q: i64) -> BigRational {
        BigRational::new(BigInt::from(p), BigInt::from(q))
    }

    fn single_site() -> LatticeState {
        let dims = Dimensions::new(1, 1).unwrap();
        LatticeState::initial(dims, &BoundaryFill::canonical(dims)).unwrap()
    }

    #[test]
    fn test_six_vertex_names() {
        let map = WeightMap::six_vertex();
        assert_eq!(map.len(), 6);
        assert_eq!(map.symbol(&Piece::new(A, A, A, A)), Some("a1"));
        assert_eq!(map.symbol(&Piece::new(B, A, A, B)), Some("b1"));
        assert_eq!(map.piece_for("c2"), Some(Piece::new(B, A, B, A)));
        assert_eq!(map.legal_pieces(), LegalPieces::six_vertex());
    }

    #[test]
    fn test_rejects_duplicate_names() {
        let result = WeightMap::from_keys([("2222", "a"), ("1111", "a")]);
        assert!(matches!(result, Err(LatticeError::DuplicateWeight(name)) if name == "a"));

        let mut map = WeightMap::new();
        map.insert(Piece::new(A, A, A, A), "a").unwrap();
        map.insert(Piece::new(A, A, A, A), "a").unwrap();
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_unknown_piece() {
        let map = WeightMap::from_keys([("2222", "a1")]).unwrap();
        let err = weight_of(&Piece::new(B, A, A, B), &map).unwrap_err();
        assert!(matches!(err, LatticeError::UnknownPiece(key) if key.to_string() == "1221"));
        assert!(partition_term(&single_site(), &map).is_err());
    }

    #[test]
    fn test_single_site_term() {
        let term = partition_term(&single_site(), &WeightMap::six_vertex()).unwrap();
        assert_eq!(term, Polynomial::variable("b1"));
    }

    #[test]
    fn test_empty_solution_set_is_zero() {
        let z = partition_function(&[], &WeightMap::six_vertex()).unwrap();
        assert!(z.is_zero());
        let map = WeightMap::six_vertex();
        let specific = SpecificWeights::six_vertex();
        assert!(partition_function(&[], &SpecificWeighting::new(&map, &specific))
            .unwrap()
            .is_zero());
    }

    #[test]
    fn test_column_substitution_uses_j() {
        let map = WeightMap::six_vertex();
        let specific = SpecificWeights::six_vertex();
        let scheme = SpecificWeighting::new(&map, &specific);
        let piece = Piece::new(A, B, A, B);
        assert_eq!(scheme.weight(&piece, 0, 2).unwrap(), Polynomial::variable("z3"));
        assert_eq!(scheme.weight(&piece, 5, 0).unwrap(), Polynomial::variable("z1"));
        assert_eq!(scheme.weight(&Piece::new(B, B, B, B), 0, 0).unwrap(), Polynomial::zero());
    }

    #[test]
    fn test_missing_substitution() {
        let map = WeightMap::six_vertex();
        let specific = SpecificWeights::new(BTreeMap::new());
        let scheme = SpecificWeighting::new(&map, &specific);
        assert!(matches!(
            scheme.weight(&Piece::new(A, A, A, A), 0, 0),
            Err(LatticeError::UnknownWeight(name)) if name == "a1"
        ));
    }

    #[test]
    fn test_substitution_json() {
        let parsed: BTreeMap<String, Substitution> =
            serde_json::from_str(r#"{"a": 1, "b": "z", "c": "3/4", "d": "t", "e": "-2"}"#).unwrap();
        assert_eq!(parsed["a"], Substitution::integer(1));
        assert_eq!(parsed["b"], Substitution::Column);
        assert_eq!(parsed["c"], Substitution::Constant(ratio(3, 4)));
        assert_eq!(parsed["d"], Substitution::Symbol("t".to_string()));
        assert_eq!(parsed["e"], Substitution::integer(-2));
        assert!(serde_json::from_str::<Substitution>(r#""1/0""#).is_err());

        let json = serde_json::to_string(&parsed).unwrap();
        let back: BTreeMap<String, Substitution> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, parsed);
    }

    #[test]
    fn test_weight_map_json() {
        let json = serde_json::to_string(&WeightMap::six_vertex()).unwrap();
        assert!(json.contains(r#""2222":"a1""#));
        let back: WeightMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, WeightMap::six_vertex());
        assert!(serde_json::from_str::<WeightMap>(r#"{"2222":"a","1111":"a"}"#).is_err());
    }

    #[test]
    fn test_decimal_substitutions_are_exact() {
        let parsed: BTreeMap<String, Substitution> =
            serde_json::from_str(r#"{"a": 0.5, "b": 0.1, "c": "-1.25", "d": 2.0}"#).unwrap();
        assert_eq!(parsed["a"], Substitution::Constant(ratio(1, 2)));
        assert_eq!(parsed["b"], Substitution::Constant(ratio(1, 10)));
        assert_eq!(parsed["c"], Substitution::Constant(ratio(-5, 4)));
        assert_eq!(parsed["d"], Substitution::integer(2));
        assert!(serde_json::from_str::<Substitution>(r#""1.x""#).is_err());
        assert_eq!(parse_decimal(".5"), Some(ratio(1, 2)));
        assert_eq!(parse_decimal("3"), None);
    }

    #[test]
    fn test_large_constants_serialize_as_text() {
        let big: BigInt = "123456789012345678901234567890".parse().unwrap();
        let sub = Substitution::Constant(BigRational::from_integer(big));
        let json = serde_json::to_string(&sub).unwrap();
        assert_eq!(json, r#""123456789012345678901234567890""#);
        assert_eq!(serde_json::from_str::<Substitution>(&json).unwrap(), sub);
    }
}
