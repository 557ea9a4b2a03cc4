//! Fields: node values stored in the data layout of a space.
use crate::error::OperatorError;
use crate::execution::Instantiated;
use crate::expression::Expression;
use crate::geometry::LocalGeometry;
use crate::space::{HorizontalDim, NodeIndex, SlabIndex, Space};
use crate::value::NodeValue;
use crate::Real;
use std::sync::Arc;

/// Values of type `V` at every node of a space.
#[derive(Debug, Clone)]
pub struct Field<V: NodeValue, D: HorizontalDim> {
    data: Vec<V>,
    space: Arc<Space<V::Scalar, D>>,
}

impl<V: NodeValue, D: HorizontalDim> Field<V, D> {
    pub fn zeros(space: &Arc<Space<V::Scalar, D>>) -> Self {
        Self {
            data: vec![V::zero(); space.layout().len()],
            space: Arc::clone(space),
        }
    }

    /// Initializes the field node by node from the local geometry.
    ///
    /// The scalar type is taken from `space`, so the closure argument needs no annotation.
    pub fn from_fn<T: Real>(space: &Arc<Space<T, D>>, mut f: impl FnMut(&LocalGeometry<T>) -> V) -> Self
    where
        V: NodeValue<Scalar = T>,
    {
        Self {
            data: space.geometry().iter().map(|g| f(g)).collect(),
            space: Arc::clone(space),
        }
    }

    /// Wraps existing data, which must be given in the layout of the space.
    pub fn from_data(space: &Arc<Space<V::Scalar, D>>, data: Vec<V>) -> Result<Self, OperatorError> {
        let expected = space.layout().len();
        if data.len() != expected {
            return Err(OperatorError::FieldLengthMismatch {
                expected,
                found: data.len(),
            });
        }
        Ok(Self::from_parts_unchecked(space, data))
    }

    pub(crate) fn from_parts_unchecked(space: &Arc<Space<V::Scalar, D>>, data: Vec<V>) -> Self {
        debug_assert_eq!(data.len(), space.layout().len());
        Self {
            data,
            space: Arc::clone(space),
        }
    }

    pub fn space(&self) -> &Arc<Space<V::Scalar, D>> {
        &self.space
    }

    pub fn get(&self, node: NodeIndex) -> V {
        self.data[self.space.layout().index(node)]
    }

    pub fn set(&mut self, node: NodeIndex, value: V) {
        let index = self.space.layout().index(node);
        self.data[index] = value;
    }

    pub fn slab(&self, slab: SlabIndex) -> &[V] {
        &self.data[self.space.layout().slab_range(slab)]
    }

    pub fn data(&self) -> &[V] {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut [V] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<V> {
        self.data
    }

    /// Iterates over node values together with their local geometry.
    pub fn iter_with_geometry(&self) -> impl Iterator<Item = (&V, &LocalGeometry<V::Scalar>)> {
        self.data.iter().zip(self.space.geometry())
    }

    /// Evaluates the expression and stores the result in this field.
    ///
    /// For repeated evaluation of the same expression, instantiate it once with
    /// [`Instantiated::new`] and call [`Instantiated::evaluate_into`] instead.
    pub fn assign<E>(&mut self, expression: E) -> Result<(), OperatorError>
    where
        E: Expression<Scalar = V::Scalar, Dim = D, Output = V>,
    {
        let space = Arc::clone(&self.space);
        Instantiated::new(expression, &space)?.evaluate_into(self)
    }
}
