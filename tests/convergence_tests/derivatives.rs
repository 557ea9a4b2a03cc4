use crate::common::{line_space, plane_space};
use matrixcompare::assert_scalar_eq;
use spectral_elements::integrate::{integrate, l2_error, l2_norm};
use spectral_elements::vector::{Axes12, Axis1, Cartesian};
use spectral_elements::{evaluate, ExpressionExt, Field};
use std::f64::consts::PI;

/// The L2 error of the Cartesian gradient of `sin(x)` on a periodic line.
fn line_gradient_error(nq: usize, num_elements: usize) -> f64 {
    let space = line_space(nq, num_elements);
    let f = Field::from_fn(&space, |g| g.coordinates().x.sin());
    let gradient = evaluate((&f).gradient()).unwrap();
    let cartesian: Vec<f64> = gradient
        .iter_with_geometry()
        .map(|(u, g)| u.project::<Cartesian, Axis1>(g).u1())
        .collect();
    let cartesian = Field::from_data(&space, cartesian).unwrap();
    l2_error(&cartesian, |g| g.coordinates().x.cos())
}

fn line_laplacian_error(nq: usize, num_elements: usize) -> f64 {
    let space = line_space(nq, num_elements);
    let f = Field::from_fn(&space, |g| g.coordinates().x.sin());
    let laplacian = evaluate((&f).gradient().divergence()).unwrap();
    l2_error(&laplacian, |g| -g.coordinates().x.sin())
}

#[test]
fn line_gradient_converges() {
    let errors: Vec<f64> = [8, 16, 32]
        .iter()
        .map(|&n| line_gradient_error(4, n))
        .collect();
    for pair in errors.windows(2) {
        assert!(pair[0] / pair[1] > 5.0, "Insufficient convergence: {:?}", errors);
    }
    assert!(errors[2] < 1e-4);
}

#[test]
fn sine_derivatives_on_four_cubic_elements() {
    let space = line_space(4, 4);
    let f = Field::from_fn(&space, |g| g.coordinates().x.sin());

    let gradient = evaluate((&f).gradient()).unwrap();
    let gradient_error = gradient
        .iter_with_geometry()
        .map(|(u, g)| (u.project::<Cartesian, Axis1>(g).u1() - g.coordinates().x.cos()).abs())
        .fold(0.0, f64::max);
    assert!(gradient_error < 5e-2, "Gradient error {}", gradient_error);

    let laplacian = evaluate((&f).gradient().divergence()).unwrap();
    let laplacian_error = laplacian
        .iter_with_geometry()
        .map(|(value, g)| (value + g.coordinates().x.sin()).abs())
        .fold(0.0, f64::max);
    assert!(laplacian_error < 0.3, "Laplacian error {}", laplacian_error);
}

#[test]
fn higher_order_reduces_gradient_error() {
    assert!(line_gradient_error(6, 8) < 0.1 * line_gradient_error(4, 8));
}

#[test]
fn line_laplacian_converges() {
    let errors: Vec<f64> = [8, 16, 32]
        .iter()
        .map(|&n| line_laplacian_error(4, n))
        .collect();
    for pair in errors.windows(2) {
        assert!(pair[0] / pair[1] > 3.0, "Insufficient convergence: {:?}", errors);
    }
    assert!(errors[1] < 0.05);
}

#[test]
fn plane_gradient_is_accurate() {
    let space = plane_space(5, 8);
    let f = Field::from_fn(&space, |g| {
        let x = g.coordinates();
        x.x.sin() * (2.0 * x.y).cos() + 0.5 * (x.x + x.y).cos()
    });
    let gradient = evaluate((&f).gradient()).unwrap();

    let error_squared: f64 = gradient
        .iter_with_geometry()
        .map(|(u, g)| {
            let (x, y) = (g.coordinates().x, g.coordinates().y);
            let exact_x = x.cos() * (2.0 * y).cos() - 0.5 * (x + y).sin();
            let exact_y = -2.0 * x.sin() * (2.0 * y).sin() - 0.5 * (x + y).sin();
            let u = u.project::<Cartesian, Axes12>(g);
            g.weighted_jacobian() * ((u.u1() - exact_x).powi(2) + (u.u2() - exact_y).powi(2))
        })
        .sum();
    assert!(error_squared.sqrt() < 5e-2, "Gradient error {}", error_squared.sqrt());
}

#[test]
fn quadrature_integrates_smooth_periodic_functions() {
    let space = line_space(4, 8);
    let f = Field::from_fn(&space, |g| g.coordinates().x.sin().powi(2));
    assert_scalar_eq!(integrate(&f), PI, comp = abs, tol = 1e-12);

    let space = plane_space(4, 4);
    let f = Field::from_fn(&space, |g| 1.0 + (g.coordinates().x + g.coordinates().y).cos());
    assert_scalar_eq!(integrate(&f), 4.0 * PI * PI, comp = abs, tol = 1e-10);
}

#[test]
fn l2_norm_sums_over_all_entries() {
    let space = line_space(4, 8);
    let f = Field::from_fn(&space, |g| g.coordinates().x.sin());
    assert_scalar_eq!(l2_norm(&f), PI.sqrt(), comp = abs, tol = 1e-12);

    let pair = Field::from_fn(&space, |g| [g.coordinates().x.sin(), g.coordinates().x.cos()]);
    assert_scalar_eq!(l2_norm(&pair), (2.0 * PI).sqrt(), comp = abs, tol = 1e-12);
}
