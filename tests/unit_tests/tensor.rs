use matrixcompare::{assert_matrix_eq, assert_scalar_eq};
use nalgebra::DMatrix;
use spectral_elements::tensor::{contract_column, contract_row, tensor_product_1d, tensor_product_2d};

#[test]
fn row_and_column_contractions_agree_with_matrix_products() {
    let m = DMatrix::from_row_slice(2, 3, &[1.0, 2.0, 3.0, -1.0, 0.5, 4.0]);
    let x = [2.0, -1.0, 0.5];
    assert_scalar_eq!(contract_row(&m, 1, |k| x[k]), -2.0 - 0.5 + 2.0);

    let y = [3.0, 1.0];
    assert_scalar_eq!(contract_column(&m, 2, |k| y[k]), 9.0 + 4.0);
}

#[test]
fn tensor_product_1d_matches_matrix_vector_product() {
    let m = DMatrix::from_row_slice(3, 2, &[1.0, 2.0, 0.0, 1.0, -1.0, 3.0]);
    let input = [1.0, 2.0];
    let mut output = [0.0; 3];
    tensor_product_1d(&m, &input, &mut output);
    assert_eq!(output, [5.0, 2.0, 5.0]);
}

#[test]
fn tensor_product_2d_matches_dense_sandwich_product() {
    let (m, n) = (2, 3);
    let matrix = DMatrix::from_row_slice(m, n, &[1.0, -2.0, 0.5, 0.25, 1.0, 3.0]);
    let input: Vec<f64> = (0..n * n).map(|k| (k as f64).sin()).collect();

    let mut temp = vec![0.0; m * n];
    let mut output = vec![0.0; m * m];
    tensor_product_2d(&matrix, &input, &mut temp, &mut output);

    // Node (i, j) is stored at j * n + i, which is column-major storage of X(i, j)
    let x = DMatrix::from_column_slice(n, n, &input);
    let expected = &matrix * x * matrix.transpose();
    let result = DMatrix::from_column_slice(m, m, &output);
    assert_matrix_eq!(result, expected, comp = abs, tol = 1e-14);
}
