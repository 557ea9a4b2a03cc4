//! Nodal Lagrange bases on the reference interval.
//!
//! All constructions use the barycentric form of the Lagrange polynomials, which is stable
//! for the node sets used by spectral elements.

use crate::{DenseMatrix, Error};

fn check_distinct(points: &[f64]) -> Result<(), Error> {
    for (i, x_i) in points.iter().enumerate() {
        if points[i + 1..].iter().any(|x_j| x_j == x_i) {
            return Err(Error::RepeatedNodes);
        }
    }
    Ok(())
}

/// Computes the barycentric weights `w_k = 1 / prod_{m != k} (x_k - x_m)`.
pub fn barycentric_weights(points: &[f64]) -> Result<Vec<f64>, Error> {
    check_distinct(points)?;
    let weights = points
        .iter()
        .enumerate()
        .map(|(k, x_k)| {
            let product: f64 = points
                .iter()
                .enumerate()
                .filter(|(m, _)| *m != k)
                .map(|(_, x_m)| x_k - x_m)
                .product();
            1.0 / product
        })
        .collect();
    Ok(weights)
}

/// Computes the differentiation matrix of the Lagrange basis through the given points.
///
/// Entry `(i, k)` holds `l_k'(x_i)`, so that multiplying nodal values with the matrix
/// yields the derivative of the interpolating polynomial at the nodes. The diagonal is
/// computed with the negative sum trick so that each row sums to zero exactly.
pub fn differentiation_matrix(points: &[f64]) -> Result<DenseMatrix, Error> {
    let w = barycentric_weights(points)?;
    let n = points.len();

    let mut entries = vec![0.0; n * n];
    for i in 0..n {
        let mut diagonal = 0.0;
        for k in 0..n {
            if i != k {
                let d_ik = (w[k] / w[i]) / (points[i] - points[k]);
                entries[i * n + k] = d_ik;
                diagonal -= d_ik;
            }
        }
        entries[i * n + i] = diagonal;
    }

    Ok(DenseMatrix::from_fn(n, n, |i, k| entries[i * n + k]))
}

/// Computes the matrix evaluating the Lagrange basis through `source_points` at
/// `target_points`.
///
/// Entry `(i, k)` holds `l_k(y_i)`, where `y_i` is the `i`-th target point. Target points
/// that coincide with a source point produce an exact unit row.
pub fn interpolation_matrix(source_points: &[f64], target_points: &[f64]) -> Result<DenseMatrix, Error> {
    let w = barycentric_weights(source_points)?;
    let n = source_points.len();

    let matrix = DenseMatrix::from_fn(target_points.len(), n, |i, k| {
        let y = target_points[i];
        if let Some(coincident) = source_points.iter().position(|&x| x == y) {
            return if coincident == k { 1.0 } else { 0.0 };
        }
        let denominator: f64 = source_points
            .iter()
            .zip(&w)
            .map(|(x_m, w_m)| w_m / (y - x_m))
            .sum();
        (w[k] / (y - source_points[k])) / denominator
    });

    Ok(matrix)
}
