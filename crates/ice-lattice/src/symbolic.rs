//! Exact multivariate polynomials over rational coefficients.
//!
//! Weights and partition functions are values of this type. Arithmetic is
//! exact with arbitrary-precision coefficients; floating point only enters
//! through [`Polynomial::evaluate`].

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::iter::{Product, Sum};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub};

use num_bigint::BigInt;
use num_rational::{BigRational, Rational64};
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::error::{LatticeError, Result};

/// Product of named variables raised to positive powers
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Monomial(BTreeMap<String, u32>);

impl Monomial {
    /// The empty product
    pub fn one() -> Self {
        Self::default()
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self(BTreeMap::from([(name.into(), 1)]))
    }

    pub fn from_powers<'a>(powers: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let mut m = Self::one();
        for (name, exp) in powers {
            if exp > 0 {
                *m.0.entry(name.to_string()).or_insert(0) += exp;
            }
        }
        m
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    pub fn degree(&self) -> u32 {
        self.0.values().sum()
    }

    pub fn power(&self, name: &str) -> u32 {
        self.0.get(name).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.0.iter().map(|(name, &exp)| (name.as_str(), exp))
    }

    fn times(&self, other: &Monomial) -> Monomial {
        let mut out = self.clone();
        for (name, exp) in &other.0 {
            *out.0.entry(name.clone()).or_insert(0) += exp;
        }
        out
    }

    fn to_latex(&self) -> String {
        self.iter()
            .map(|(name, exp)| {
                let base = latex_symbol(name);
                if exp == 1 {
                    base
                } else {
                    format!("{}^{{{}}}", base, exp)
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        let factors: Vec<String> = self
            .iter()
            .map(|(name, exp)| {
                if exp == 1 {
                    name.to_string()
                } else {
                    format!("{}^{}", name, exp)
                }
            })
            .collect();
        write!(f, "{}", factors.join("*"))
    }
}

/// `a1` becomes `a_{1}`; names without a trailing number are kept as is
fn latex_symbol(name: &str) -> String {
    if name.contains('_') {
        return name.to_string();
    }
    let split = name.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let (stem, index) = name.split_at(split);
    if stem.is_empty() || index.is_empty() {
        name.to_string()
    } else {
        format!("{}_{{{}}}", stem, index)
    }
}

/// Sum of monomials with non-zero rational coefficients
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Polynomial {
    terms: BTreeMap<Monomial, BigRational>,
}

impl Polynomial {
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    pub fn constant(c: BigRational) -> Self {
        Self::term(Monomial::one(), c)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::term(Monomial::var(name), BigRational::one())
    }

    pub fn term(monomial: Monomial, c: BigRational) -> Self {
        let mut p = Self::zero();
        p.add_term(monomial, c);
        p
    }

    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn coefficient(&self, monomial: &Monomial) -> BigRational {
        self.terms.get(monomial).cloned().unwrap_or_else(BigRational::zero)
    }

    pub fn terms(&self) -> impl Iterator<Item = (&Monomial, &BigRational)> {
        self.terms.iter()
    }

    pub fn variables(&self) -> BTreeSet<String> {
        self.terms
            .keys()
            .flat_map(|m| m.iter().map(|(name, _)| name.to_string()))
            .collect()
    }

    /// The value of a constant polynomial
    pub fn as_constant(&self) -> Option<BigRational> {
        match self.terms.len() {
            0 => Some(BigRational::zero()),
            1 => self.terms.get(&Monomial::one()).cloned(),
            _ => None,
        }
    }

    fn add_term(&mut self, monomial: Monomial, c: BigRational) {
        if c.is_zero() {
            return;
        }
        let entry = self.terms.entry(monomial).or_insert_with(BigRational::zero);
        *entry += c;
        if entry.is_zero() {
            self.terms.retain(|_, c| !c.is_zero());
        }
    }

    pub fn pow(&self, exp: u32) -> Polynomial {
        (0..exp).fold(Polynomial::one(), |acc, _| &acc * self)
    }

    /// Replace bound variables by polynomials; unbound ones stay symbolic
    pub fn substitute(&self, bindings: &BTreeMap<String, Polynomial>) -> Polynomial {
        self.terms
            .iter()
            .map(|(monomial, c)| {
                let start = Polynomial::constant(c.clone());
                monomial.iter().fold(start, |acc, (name, exp)| match bindings.get(name) {
                    Some(value) => &acc * &value.pow(exp),
                    None => {
                        let monomial = Monomial::from_powers([(name, exp)]);
                        &acc * &Polynomial::term(monomial, BigRational::one())
                    }
                })
            })
            .sum()
    }

    /// Numeric value under `values`; every variable must be bound
    pub fn evaluate(&self, values: &BTreeMap<String, f64>) -> Result<f64> {
        let mut total = 0.0;
        for (monomial, c) in &self.terms {
            let mut product = ratio_to_f64(c);
            for (name, exp) in monomial.iter() {
                let v = values
                    .get(name)
                    .ok_or_else(|| LatticeError::UnboundVariable(name.to_string()))?;
                product *= v.powi(exp as i32);
            }
            total += product;
        }
        Ok(total)
    }

    /// Terms by descending total degree, ties in variable order
    fn ordered_terms(&self) -> Vec<(&Monomial, &BigRational)> {
        let mut terms: Vec<_> = self.terms.iter().collect();
        terms.sort_by(|(a, _), (b, _)| b.degree().cmp(&a.degree()).then_with(|| a.cmp(b)));
        terms
    }

    pub fn to_latex(&self) -> String {
        if self.is_zero() {
            return "0".to_string();
        }
        let mut out = String::new();
        for (idx, (monomial, c)) in self.ordered_terms().into_iter().enumerate() {
            push_sign(&mut out, idx, c);
            let magnitude = c.abs();
            let body = monomial.to_latex();
            let coeff = if magnitude.is_integer() {
                magnitude.numer().to_string()
            } else {
                format!("\\frac{{{}}}{{{}}}", magnitude.numer(), magnitude.denom())
            };
            match (magnitude.is_one(), monomial.is_one()) {
                (_, true) => out.push_str(&coeff),
                (true, false) => out.push_str(&body),
                (false, false) => {
                    out.push_str(&coeff);
                    out.push(' ');
                    out.push_str(&body);
                }
            }
        }
        out
    }
}

fn push_sign(out: &mut String, idx: usize, c: &BigRational) {
    match (idx, c.is_negative()) {
        (0, true) => out.push('-'),
        (0, false) => {}
        (_, true) => out.push_str(" - "),
        (_, false) => out.push_str(" + "),
    }
}

fn ratio_to_f64(c: &BigRational) -> f64 {
    match (c.numer().to_f64(), c.denom().to_f64()) {
        (Some(numer), Some(denom)) => numer / denom,
        _ => f64::NAN,
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        let mut out = String::new();
        for (idx, (monomial, c)) in self.ordered_terms().into_iter().enumerate() {
            push_sign(&mut out, idx, c);
            let magnitude = c.abs();
            match (magnitude.is_one(), monomial.is_one()) {
                (_, true) => out.push_str(&magnitude.to_string()),
                (true, false) => out.push_str(&monomial.to_string()),
                (false, false) => out.push_str(&format!("{}*{}", magnitude, monomial)),
            }
        }
        write!(f, "{}", out)
    }
}

impl From<i64> for Polynomial {
    fn from(c: i64) -> Self {
        Polynomial::constant(BigRational::from_integer(BigInt::from(c)))
    }
}

impl From<Rational64> for Polynomial {
    fn from(c: Rational64) -> Self {
        Polynomial::constant(BigRational::new(BigInt::from(*c.numer()), BigInt::from(*c.denom())))
    }
}

impl From<BigRational> for Polynomial {
    fn from(c: BigRational) -> Self {
        Polynomial::constant(c)
    }
}

impl AddAssign<&Polynomial> for Polynomial {
    fn add_assign(&mut self, rhs: &Polynomial) {
        for (monomial, c) in &rhs.terms {
            self.add_term(monomial.clone(), c.clone());
        }
    }
}

impl AddAssign for Polynomial {
    fn add_assign(&mut self, rhs: Polynomial) {
        *self += &rhs;
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(mut self, rhs: Polynomial) -> Polynomial {
        self += &rhs;
        self
    }
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Polynomial {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(mut self) -> Polynomial {
        for c in self.terms.values_mut() {
            *c = -c.clone();
        }
        self
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Polynomial) -> Polynomial {
        self + (-rhs)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Polynomial {
        let mut out = Polynomial::zero();
        for (ma, ca) in &self.terms {
            for (mb, cb) in &rhs.terms {
                out.add_term(ma.times(mb), ca * cb);
            }
        }
        out
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Polynomial) -> Polynomial {
        &self * &rhs
    }
}

impl MulAssign<&Polynomial> for Polynomial {
    fn mul_assign(&mut self, rhs: &Polynomial) {
        *self = &*self * rhs;
    }
}

impl Sum for Polynomial {
    fn sum<I: Iterator<Item = Polynomial>>(iter: I) -> Polynomial {
        iter.fold(Polynomial::zero(), |acc, p| acc + p)
    }
}

impl Product for Polynomial {
    fn product<I: Iterator<Item = Polynomial>>(iter: I) -> Polynomial {
        iter.fold(Polynomial::one(), |acc, p| acc * p)
    }
}
