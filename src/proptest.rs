//! Strategies for property-based testing of fields and operators.
use crate::field::Field;
use crate::space::{HorizontalDim, Space};
use crate::value::NodeValue;
use crate::vector::{Cartesian12Vector, Covariant12Vector};
use ::proptest::collection::vec;
use ::proptest::prelude::*;
use std::sync::Arc;

/// Values in a range small enough that sums over a slab stay well-conditioned.
pub fn node_scalar() -> impl Strategy<Value = f64> {
    -10.0..10.0
}

pub fn covariant12_vector() -> impl Strategy<Value = Covariant12Vector<f64>> {
    [node_scalar(), node_scalar()].prop_map(|[u1, u2]| Covariant12Vector::new(u1, u2))
}

pub fn cartesian12_vector() -> impl Strategy<Value = Cartesian12Vector<f64>> {
    [node_scalar(), node_scalar()].prop_map(|[u1, u2]| Cartesian12Vector::new(u1, u2))
}

/// Fields with independently drawn node values.
///
/// The resulting fields are generally discontinuous across element boundaries.
pub fn field<V, D, S>(space: Arc<Space<f64, D>>, values: S) -> impl Strategy<Value = Field<V, D>>
where
    V: NodeValue<Scalar = f64>,
    D: HorizontalDim,
    S: Strategy<Value = V>,
{
    let len = space.layout().len();
    vec(values, len).prop_map(move |data| Field::from_parts_unchecked(&space, data))
}

pub fn scalar_field<D: HorizontalDim>(space: Arc<Space<f64, D>>) -> impl Strategy<Value = Field<f64, D>> {
    field(space, node_scalar())
}
