//! Contractions of dense one-dimensional operator matrices with node values.
//!
//! All kernels accumulate with [`NodeValue::scaled_add`] in ascending order of the contracted
//! index, so that every evaluation path produces bit-identical results.
use crate::value::NodeValue;
use crate::Real;
use nalgebra::DMatrix;

/// Computes `sum_k M[row, k] * value(k)`.
#[inline]
pub fn contract_row<T, V>(matrix: &DMatrix<T>, row: usize, value: impl Fn(usize) -> V) -> V
where
    T: Real,
    V: NodeValue<Scalar = T>,
{
    let mut accumulator = V::zero();
    for k in 0..matrix.ncols() {
        accumulator = accumulator.scaled_add(matrix[(row, k)], value(k));
    }
    accumulator
}

/// Computes `sum_k M[k, column] * value(k)`, that is a row of the transposed matrix.
#[inline]
pub fn contract_column<T, V>(matrix: &DMatrix<T>, column: usize, value: impl Fn(usize) -> V) -> V
where
    T: Real,
    V: NodeValue<Scalar = T>,
{
    let mut accumulator = V::zero();
    for k in 0..matrix.nrows() {
        accumulator = accumulator.scaled_add(matrix[(k, column)], value(k));
    }
    accumulator
}

/// Applies the `m x n` matrix to `n` node values.
pub fn tensor_product_1d<T, V>(matrix: &DMatrix<T>, input: &[V], output: &mut [V])
where
    T: Real,
    V: NodeValue<Scalar = T>,
{
    let (m, n) = matrix.shape();
    assert_eq!(input.len(), n, "Input length must match matrix columns");
    assert_eq!(output.len(), m, "Output length must match matrix rows");
    for (i, out) in output.iter_mut().enumerate() {
        *out = contract_row(matrix, i, |k| input[k]);
    }
}

/// Applies the `m x n` matrix along both axes of an `n x n` slab, producing an `m x m` slab.
///
/// Slabs are stored with the first axis varying fastest. The contraction proceeds in two
/// passes through `temp`, which must hold `m * n` values: first along the first axis, then
/// along the second.
pub fn tensor_product_2d<T, V>(matrix: &DMatrix<T>, input: &[V], temp: &mut [V], output: &mut [V])
where
    T: Real,
    V: NodeValue<Scalar = T>,
{
    let (m, n) = matrix.shape();
    assert_eq!(input.len(), n * n, "Input length must match slab size");
    assert_eq!(temp.len(), m * n, "Temporary buffer has wrong size");
    assert_eq!(output.len(), m * m, "Output length must match slab size");

    for l in 0..n {
        for i in 0..m {
            temp[l * m + i] = contract_row(matrix, i, |k| input[l * n + k]);
        }
    }

    for j in 0..m {
        for i in 0..m {
            output[j * m + i] = contract_row(matrix, j, |l| temp[l * m + i]);
        }
    }
}
