//! Gauss-Lobatto-Legendre node sets and their nodal operator matrices in working precision.
use crate::Real;
use eyre::eyre;
use nalgebra::{convert, DMatrix, Scalar};
use spectral_quadrature::lagrange::{differentiation_matrix, interpolation_matrix};
use spectral_quadrature::univariate::try_gauss_lobatto;
use spectral_quadrature::DenseMatrix;

pub use spectral_quadrature::Error as QuadratureError;

/// The one-dimensional reference data shared by all elements of a space.
///
/// Entry `(i, k)` of the derivative matrix holds `l_k'(ξ_i)`, the derivative of the `k`-th
/// Lagrange basis polynomial at the `i`-th node.
#[derive(Debug, Clone, PartialEq)]
pub struct SpectralQuadrature<T: Scalar> {
    reference_points: Vec<f64>,
    points: Vec<T>,
    weights: Vec<T>,
    derivative: DMatrix<T>,
}

fn convert_matrix<T: Real>(matrix: &DenseMatrix) -> DMatrix<T> {
    DMatrix::from_fn(matrix.nrows(), matrix.ncols(), |i, j| convert(matrix.get(i, j)))
}

impl<T: Real> SpectralQuadrature<T> {
    /// Constructs the Gauss-Lobatto-Legendre rule with `num_points` nodes per axis.
    pub fn gauss_lobatto(num_points: usize) -> eyre::Result<Self> {
        let (weights, points) = try_gauss_lobatto(num_points).ok_or_else(|| {
            eyre!(
                "Spectral elements require at least two nodes per axis, got {}",
                num_points
            )
        })?;
        let points: Vec<f64> = points.into_iter().map(|[x]| x).collect();
        let derivative = differentiation_matrix(&points)?;

        Ok(Self {
            points: points.iter().copied().map(convert).collect(),
            reference_points: points,
            weights: weights.into_iter().map(convert).collect(),
            derivative: convert_matrix(&derivative),
        })
    }

    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    pub fn points(&self) -> &[T] {
        &self.points
    }

    pub fn weights(&self) -> &[T] {
        &self.weights
    }

    pub fn derivative_matrix(&self) -> &DMatrix<T> {
        &self.derivative
    }

    /// Returns the `m x n` matrix that interpolates nodal values on this rule's `n` nodes
    /// onto the `m` nodes of `target`.
    pub fn interpolation_matrix_to(&self, target: &Self) -> Result<DMatrix<T>, QuadratureError> {
        let matrix = interpolation_matrix(&self.reference_points, &target.reference_points)?;
        Ok(convert_matrix(&matrix))
    }
}
