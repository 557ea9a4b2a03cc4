use crate::common::{periodic_interval, periodic_square};
use matrixcompare::assert_scalar_eq;
use spectral_elements::expression::{interpolate, restrict};
use spectral_elements::integrate::inner_product;
use spectral_elements::operators::{apply_basis_change, Interpolate, OperatorKind};
use spectral_elements::space::{SlabIndex, SpaceBuilder};
use spectral_elements::{evaluate, ExpressionExt, Field, OperatorError};

#[test]
fn interpolation_reproduces_element_polynomials() {
    let topology = periodic_square(2);
    let coarse = SpaceBuilder::new(topology.clone(), 3).build().unwrap();
    let fine = SpaceBuilder::new(topology, 6).build().unwrap();

    // Quadratic in each coordinate, hence represented exactly on every element
    let p = |x: f64, y: f64| 1.0 + x * y - 0.25 * x * x * y * y;
    let f = Field::from_fn(&coarse, |g| p(g.coordinates().x, g.coordinates().y));
    let result = evaluate(interpolate(&fine, &f)).unwrap();

    assert!(std::sync::Arc::ptr_eq(result.space(), &fine));
    for (value, g) in result.iter_with_geometry() {
        let x = g.coordinates();
        assert_scalar_eq!(*value, p(x.x, x.y), comp = abs, tol = 1e-10);
    }
}

#[test]
fn restriction_undoes_interpolation_at_equal_degree() {
    let topology = periodic_square(3);
    let space = SpaceBuilder::new(topology.clone(), 4).build().unwrap();
    let same_degree = SpaceBuilder::new(topology, 4).build().unwrap();

    let f = Field::from_fn(&space, |g| (g.coordinates().x * 1.7).sin() * g.coordinates().y.cos() + 0.3);
    let round_trip = evaluate((&f).interpolate(&same_degree).restrict(&space)).unwrap();

    assert!(std::sync::Arc::ptr_eq(round_trip.space(), &space));
    for (value, expected) in round_trip.data().iter().zip(f.data()) {
        assert_scalar_eq!(*value, *expected, comp = abs, tol = 1e-13);
    }
}

#[test]
fn restriction_is_adjoint_of_interpolation() {
    let topology = periodic_square(2);
    let coarse = SpaceBuilder::new(topology.clone(), 3).build().unwrap();
    let fine = SpaceBuilder::new(topology, 5).build().unwrap();

    let f = Field::from_fn(&coarse, |g| (g.coordinates().x * 1.3).cos() + g.coordinates().y);
    let g = Field::from_fn(&fine, |g| (g.coordinates().y * 0.7).sin() * g.coordinates().x);

    let interpolated = evaluate(interpolate(&fine, &f)).unwrap();
    let restricted = evaluate(restrict(&coarse, &g)).unwrap();

    let fine_product = inner_product(&g, &interpolated);
    let coarse_product = inner_product(&restricted, &f);
    assert_scalar_eq!(fine_product, coarse_product, comp = abs, tol = 1e-10);
}

#[test]
fn slab_primitive_interpolates_on_a_line() {
    let topology = periodic_interval(3);
    let coarse = SpaceBuilder::new(topology.clone(), 2).build().unwrap();
    let fine = SpaceBuilder::new(topology, 4).build().unwrap();
    let slab = SlabIndex { h: 1, v: 0 };
    let input: Vec<f64> = coarse
        .slab_geometry(slab)
        .iter()
        .map(|g| 2.0 * g.coordinates().x)
        .collect();

    let output = apply_basis_change(&Interpolate::new(&fine), &coarse, slab, &input).unwrap();
    for (value, g) in output.iter().zip(fine.slab_geometry(slab)) {
        assert_scalar_eq!(*value, 2.0 * g.coordinates().x, comp = abs, tol = 1e-12);
    }
}

#[test]
fn basis_changes_require_a_shared_mesh() {
    let a = SpaceBuilder::new(periodic_square(2), 3).build().unwrap();
    let b = SpaceBuilder::new(periodic_square(2), 4).build().unwrap();
    let f = Field::<f64, _>::zeros(&a);

    match evaluate(interpolate(&b, &f)) {
        Err(OperatorError::IncompatibleTopology { operator, .. }) => assert_eq!(operator, OperatorKind::Interpolate),
        other => panic!("Expected incompatible topology, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn restriction_to_more_nodes_is_rejected() {
    let topology = periodic_square(2);
    let coarse = SpaceBuilder::new(topology.clone(), 3).build().unwrap();
    let fine = SpaceBuilder::new(topology, 5).build().unwrap();
    let f = Field::<f64, _>::zeros(&coarse);

    let result = evaluate(restrict(&fine, &f)).map(|_| ());
    assert_eq!(
        result,
        Err(OperatorError::InvalidRestriction {
            source_nodes: 3,
            target_nodes: 5
        })
    );
}
