use spectral_quadrature::lagrange::{differentiation_matrix, interpolation_matrix};
use spectral_quadrature::univariate::gauss_lobatto;

use matrixcompare::assert_scalar_eq;

fn lobatto_points(n: usize) -> Vec<f64> {
    gauss_lobatto(n).1.into_iter().map(|[x]| x).collect()
}

#[test]
fn differentiation_matrix_is_exact_for_polynomials() {
    for n in 2..=10 {
        let points = lobatto_points(n);
        let d = differentiation_matrix(&points).unwrap();

        // Any polynomial of degree n - 1 is differentiated exactly
        for alpha in 0..n as i32 {
            for i in 0..n {
                let derivative: f64 = (0..n).map(|k| d.get(i, k) * points[k].powi(alpha)).sum();
                let expected = if alpha == 0 {
                    0.0
                } else {
                    alpha as f64 * points[i].powi(alpha - 1)
                };
                assert_scalar_eq!(derivative, expected, comp = abs, tol = 1e-10);
            }
        }
    }
}

#[test]
fn interpolation_matrix_reproduces_polynomials() {
    let source = lobatto_points(5);
    let target = lobatto_points(7);
    let matrix = interpolation_matrix(&source, &target).unwrap();
    assert_eq!(matrix.nrows(), 7);
    assert_eq!(matrix.ncols(), 5);

    let f = |x: f64| 3.0 * x.powi(4) - x.powi(3) + 2.0 * x - 1.0;
    for (i, &y) in target.iter().enumerate() {
        let interpolated: f64 = (0..5).map(|k| matrix.get(i, k) * f(source[k])).sum();
        assert_scalar_eq!(interpolated, f(y), comp = abs, tol = 1e-12);
    }
}

#[test]
fn interpolation_onto_identical_points_is_identity() {
    let points = lobatto_points(4);
    let matrix = interpolation_matrix(&points, &points).unwrap();
    for i in 0..4 {
        for k in 0..4 {
            let expected = if i == k { 1.0 } else { 0.0 };
            assert_eq!(matrix.get(i, k), expected);
        }
    }
}
