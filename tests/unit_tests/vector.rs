use matrixcompare::assert_scalar_eq;
use nalgebra::{Matrix3, Point3, Vector3};
use spectral_elements::geometry::LocalGeometry;
use spectral_elements::vector::{
    Axes12, Cartesian, Cartesian12Vector, Contravariant, Contravariant12Vector, Covariant, Covariant12Vector,
    Covariant3Vector,
};

fn sheared_geometry() -> LocalGeometry<f64> {
    let dx_dxi = Matrix3::new(2.0, 0.5, 0.0, 0.3, 1.0, 0.0, 0.0, 0.0, 1.0);
    LocalGeometry::new(Point3::origin(), dx_dxi, 1.0).unwrap()
}

#[test]
fn components_outside_axes_are_discarded() {
    let v = Covariant12Vector::from_components(Vector3::new(1.0, 2.0, 3.0));
    assert_eq!(v.u3(), 0.0);
    assert_eq!(v, Covariant12Vector::new(1.0, 2.0));

    let w = Covariant3Vector::new(4.0);
    assert_eq!(*w.components(), Vector3::new(0.0, 0.0, 4.0));
}

#[test]
fn projection_round_trips_through_all_kinds() {
    let g = sheared_geometry();
    let u = Cartesian12Vector::new(1.0, 2.0);

    let covariant: Covariant12Vector<f64> = u.project::<Covariant, Axes12>(&g);
    let contravariant: Contravariant12Vector<f64> = covariant.project::<Contravariant, Axes12>(&g);
    let back = contravariant.project::<Cartesian, Axes12>(&g);

    assert_scalar_eq!(back.u1(), 1.0, comp = abs, tol = 1e-14);
    assert_scalar_eq!(back.u2(), 2.0, comp = abs, tol = 1e-14);
}

#[test]
fn physical_dot_is_basis_independent() {
    let g = sheared_geometry();
    let u = Cartesian12Vector::new(1.0, -2.0);
    let v = Cartesian12Vector::new(0.5, 3.0);
    let expected = 1.0 * 0.5 - 2.0 * 3.0;

    let u_covariant: Covariant12Vector<f64> = u.project(&g);
    let v_contravariant: Contravariant12Vector<f64> = v.project(&g);
    assert_scalar_eq!(u.physical_dot(&v, &g), expected, comp = abs, tol = 1e-13);
    assert_scalar_eq!(u_covariant.physical_dot(&v_contravariant, &g), expected, comp = abs, tol = 1e-13);
}

#[test]
fn debug_output_names_kind_and_axes() {
    let v = Contravariant12Vector::new(1.0, 2.0);
    assert_eq!(format!("{:?}", v), "Contravariant12Vector(1.0, 2.0)");
}
