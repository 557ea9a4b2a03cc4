//! Quadrature rules and nodal operator matrices for tensor-product spectral elements.
//!
//! The crate is deliberately free of dependencies and works in `f64` throughout. Consumers
//! convert the results to their own working precision and matrix types.
//!
//! All rules are defined on the reference interval `[-1, 1]`.

use std::fmt;
use std::fmt::{Display, Formatter};

pub mod lagrange;
pub mod univariate;

/// Errors raised while building nodal operator matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The nodes passed to a Lagrange construction are not pairwise distinct.
    RepeatedNodes,
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Error::RepeatedNodes => f.write_str("Lagrange nodes must be pairwise distinct"),
        }
    }
}

impl std::error::Error for Error {}

/// A D-dimensional point.
pub type Point<const D: usize> = [f64; D];

/// A D-dimensional rule, given as a pair of weights and points.
pub type Rule<const D: usize> = (Vec<f64>, Vec<Point<D>>);

/// A dense matrix stored in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseMatrix {
    nrows: usize,
    ncols: usize,
    data: Vec<f64>,
}

impl DenseMatrix {
    pub fn from_fn(nrows: usize, ncols: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(nrows * ncols);
        for i in 0..nrows {
            for j in 0..ncols {
                data.push(f(i, j));
            }
        }
        Self { nrows, ncols, data }
    }

    pub fn nrows(&self) -> usize {
        self.nrows
    }

    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.nrows && j < self.ncols, "Matrix index out of bounds");
        self.data[i * self.ncols + j]
    }

    /// The entries in row-major order.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Integrates the given function with the given one-dimensional rule.
pub fn integrate(rule: &Rule<1>, f: impl Fn(&Point<1>) -> f64) -> f64 {
    let (weights, points) = rule;
    weights
        .iter()
        .zip(points)
        .map(|(w, x)| w * f(x))
        .sum()
}
