//! One-dimensional rules on the reference interval `[-1, 1]`.
//!
//! Both families are symmetric about the origin, so only the nodes in `[-1, 0]` are located
//! numerically and the rest are obtained by reflection.

use crate::Rule;
use std::f64::consts::PI;

const NEWTON_TOLERANCE: f64 = 1e-15;
const MAX_NEWTON_ITERATIONS: usize = 100;

/// Returns `(P_n(x), P_{n-1}(x))` by Bonnet's three-term recursion.
fn legendre_pair(n: usize, x: f64) -> (f64, f64) {
    (1..=n).fold((1.0, 0.0), |(current, previous), k| {
        let k = k as f64;
        (((2.0 * k - 1.0) * x * current - (k - 1.0) * previous) / k, current)
    })
}

/// `P'_n(x)`, valid only in the open interval `(-1, 1)`.
fn legendre_derivative(n: usize, x: f64) -> f64 {
    let (p, p_prev) = legendre_pair(n, x);
    n as f64 * (x * p - p_prev) / (x * x - 1.0)
}

/// Applies Newton updates `x <- x - step(x)` until the update is negligible.
fn refine(mut x: f64, step: impl Fn(f64) -> f64) -> f64 {
    for _ in 0..MAX_NEWTON_ITERATIONS {
        let dx = step(x);
        x -= dx;
        if dx.abs() <= NEWTON_TOLERANCE {
            break;
        }
    }
    x
}

/// Builds an `n`-point rule from its `(point, weight)` pairs in `[-1, 0]`, in ascending order.
///
/// For odd `n` the last pair must be the midpoint, which is not duplicated.
fn reflect(n: usize, left: Vec<(f64, f64)>) -> Rule<1> {
    debug_assert_eq!(left.len(), (n + 1) / 2);
    let mirrored = left.iter().rev().skip(n % 2).map(|&(x, w)| (-x, w));
    let (points, weights): (Vec<_>, Vec<_>) = left
        .iter()
        .copied()
        .chain(mirrored)
        .map(|(x, w)| ([x], w))
        .unzip();
    debug_assert_eq!(points.len(), n);
    (weights, points)
}

/// The `n`-point Gauss-Legendre rule, exact for polynomials of degree `2n - 1`.
///
/// # Panics
///
/// Panics if `num_points` is zero.
pub fn gauss(num_points: usize) -> Rule<1> {
    let n = num_points;
    assert!(n > 0, "Gauss rules require at least one point");

    let left = (0..(n + 1) / 2)
        .map(|i| {
            let x = if n % 2 == 1 && 2 * i + 1 == n {
                0.0
            } else {
                let guess = -(PI * (i as f64 + 0.75) / (n as f64 + 0.5)).cos();
                refine(guess, |x| legendre_pair(n, x).0 / legendre_derivative(n, x))
            };
            let dp = legendre_derivative(n, x);
            (x, 2.0 / ((1.0 - x * x) * dp * dp))
        })
        .collect();

    reflect(n, left)
}

/// The `n`-point Gauss-Lobatto-Legendre rule, or `None` if `n < 2`.
///
/// The nodes are the end points together with the roots of `P'_{n-1}`. The rule is exact for
/// polynomials of degree `2n - 3`.
pub fn try_gauss_lobatto(num_points: usize) -> Option<Rule<1>> {
    let n = num_points;
    if n < 2 {
        return None;
    }
    let degree = n - 1;

    let left = (0..(n + 1) / 2)
        .map(|i| {
            let x = if i == 0 {
                -1.0
            } else if n % 2 == 1 && 2 * i + 1 == n {
                0.0
            } else {
                // (1 - x²) P'_N is proportional to x P_N - P_{N-1}, whose derivative is n P_N
                let guess = -(PI * i as f64 / degree as f64).cos();
                refine(guess, |x| {
                    let (p, p_prev) = legendre_pair(degree, x);
                    (x * p - p_prev) / (n as f64 * p)
                })
            };
            let (p, _) = legendre_pair(degree, x);
            (x, 2.0 / ((degree * n) as f64 * p * p))
        })
        .collect();

    Some(reflect(n, left))
}

/// Like [`try_gauss_lobatto`], but panics if fewer than two points are requested.
pub fn gauss_lobatto(num_points: usize) -> Rule<1> {
    try_gauss_lobatto(num_points).expect("Gauss-Lobatto rules require at least two points")
}
