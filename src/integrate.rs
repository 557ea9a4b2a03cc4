//! Quadrature-based integrals and norms of fields.
use crate::field::Field;
use crate::geometry::LocalGeometry;
use crate::space::HorizontalDim;
use crate::value::NodeValue;
use crate::Real;
use itertools::izip;
use nalgebra::ComplexField;
use num::Zero;
use std::sync::Arc;

/// Approximates the integral of the field over the domain of its space.
pub fn integrate<V: NodeValue, D: HorizontalDim>(field: &Field<V, D>) -> V {
    field
        .iter_with_geometry()
        .fold(V::zero(), |acc, (value, geometry)| {
            acc.scaled_add(geometry.weighted_jacobian(), *value)
        })
}

/// The discrete inner product `sum WJ * a * b` of two scalar fields on the same space.
///
/// # Panics
///
/// Panics if the fields are not defined on the same space.
pub fn inner_product<D: HorizontalDim, T>(a: &Field<T, D>, b: &Field<T, D>) -> T
where
    T: NodeValue<Scalar = T> + Real,
{
    assert!(
        Arc::ptr_eq(a.space(), b.space()),
        "Inner product requires fields on the same space"
    );
    izip!(a.data(), b.data(), a.space().geometry())
        .fold(<T as Zero>::zero(), |acc, (&x, &y, g)| acc + g.weighted_jacobian() * x * y)
}

/// The discrete $L^2$ norm, using the component norm of [`NodeValue::norm_squared`].
pub fn l2_norm<V: NodeValue, D: HorizontalDim>(field: &Field<V, D>) -> V::Scalar {
    field
        .iter_with_geometry()
        .fold(V::Scalar::zero(), |acc, (value, geometry)| {
            acc + geometry.weighted_jacobian() * value.norm_squared()
        })
        .sqrt()
}

/// The discrete $L^2$ error $\norm{u_h - u}$ against an exact solution given per node.
pub fn l2_error<V, D>(u_h: &Field<V, D>, u: impl Fn(&LocalGeometry<V::Scalar>) -> V) -> V::Scalar
where
    V: NodeValue,
    D: HorizontalDim,
{
    u_h.iter_with_geometry()
        .fold(V::Scalar::zero(), |acc, (value, geometry)| {
            let error = value.difference(u(geometry));
            acc + geometry.weighted_jacobian() * error.norm_squared()
        })
        .sqrt()
}
