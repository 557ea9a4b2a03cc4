use crate::common::{extruded_space, plane_space, smooth_scalar};
use matrixcompare::assert_scalar_eq;
use spectral_elements::dss::weighted_dss;
use spectral_elements::execution::Device;
use spectral_elements::vector::Covariant3Vector;
use spectral_elements::{evaluate, ExpressionExt, Field};

#[test]
fn curl_of_gradient_vanishes() {
    let space = extruded_space(5, 3, Device::Serial);
    let f = Field::from_fn(&space, |g| {
        let x = g.coordinates();
        smooth_scalar(x.x, x.y, x.z)
    });
    let result = evaluate((&f).gradient().curl()).unwrap();
    for value in result.data() {
        assert_scalar_eq!(value.u3(), 0.0, comp = abs, tol = 1e-9);
    }
}

#[test]
fn divergence_of_curl_vanishes() {
    let space = plane_space(5, 3);
    let psi = Field::from_fn(&space, |g| {
        let x = g.coordinates();
        Covariant3Vector::new((x.x - 2.0 * x.y).sin() + x.y.cos())
    });
    let result = evaluate((&psi).curl().divergence()).unwrap();
    for value in result.data() {
        assert_scalar_eq!(*value, 0.0, comp = abs, tol = 1e-9);
    }
}

#[test]
fn weak_gradient_matches_gradient_after_summation() {
    let space = plane_space(4, 3);
    let f = Field::from_fn(&space, |g| smooth_scalar(g.coordinates().x, g.coordinates().y, 0.0));

    let mut strong = evaluate((&f).gradient()).unwrap();
    let mut weak = evaluate((&f).weak_gradient()).unwrap();
    weighted_dss(&mut strong);
    weighted_dss(&mut weak);

    for (a, b) in strong.data().iter().zip(weak.data()) {
        assert_scalar_eq!(a.u1(), b.u1(), comp = abs, tol = 1e-10);
        assert_scalar_eq!(a.u2(), b.u2(), comp = abs, tol = 1e-10);
    }
}

#[test]
fn weak_divergence_of_summed_gradient_is_symmetric_laplacian() {
    // For the weak Laplacian L = weak_div(grad) the matrix WJ * L is symmetric, so that
    // <L f, g> = <f, L g> holds exactly after summation
    let space = plane_space(4, 2);
    let f = Field::from_fn(&space, |g| smooth_scalar(g.coordinates().x, g.coordinates().y, 0.0));
    let g = Field::from_fn(&space, |g| (g.coordinates().x - g.coordinates().y).cos().powi(2));

    let mut lf = evaluate((&f).gradient().weak_divergence()).unwrap();
    let mut lg = evaluate((&g).gradient().weak_divergence()).unwrap();
    weighted_dss(&mut lf);
    weighted_dss(&mut lg);

    let a = spectral_elements::integrate::inner_product(&lf, &g);
    let b = spectral_elements::integrate::inner_product(&f, &lg);
    assert_scalar_eq!(a, b, comp = abs, tol = 1e-9);
}
