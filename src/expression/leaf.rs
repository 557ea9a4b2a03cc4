use crate::error::OperatorError;
use crate::execution::{Block, ThreadIndex};
use crate::expression::Expression;
use crate::field::Field;
use crate::space::{HorizontalDim, NodeIndex, SlabIndex, Space};
use crate::value::NodeValue;
use std::marker::PhantomData;
use std::sync::Arc;

impl<'a, V: NodeValue, D: HorizontalDim> Expression for &'a Field<V, D> {
    type Scalar = V::Scalar;
    type Dim = D;
    type Output = V;
    type SlabScratch = ();
    type SharedMemory = ();

    fn space(&self) -> Option<&Arc<Space<V::Scalar, D>>> {
        Some(Field::space(self))
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        Ok(())
    }

    fn max_nodes_per_axis(&self) -> usize {
        Field::space(self).nq()
    }

    fn slab_scratch(&self) -> Result<(), OperatorError> {
        Ok(())
    }

    fn prepare_slab(&self, _slab: SlabIndex, _scratch: &mut ()) {}

    fn slab_node(&self, node: NodeIndex, _scratch: &()) -> V {
        self.get(node)
    }

    fn shared_memory(&self, _levels_per_block: usize) -> Result<(), OperatorError> {
        Ok(())
    }

    fn resolve_shared(&self, _block: &Block, _shared: &mut ()) {}

    fn block_node(&self, thread: ThreadIndex, block: &Block, _shared: &()) -> V {
        self.get(block.node(thread))
    }
}

/// The same value at every node.
///
/// A constant is not attached to a space. It takes the space of the expressions it is
/// combined with.
#[derive(Debug, Clone, Copy)]
pub struct Constant<V, D> {
    value: V,
    marker: PhantomData<D>,
}

impl<V: NodeValue, D: HorizontalDim> Constant<V, D> {
    pub fn new(value: V) -> Self {
        Self {
            value,
            marker: PhantomData,
        }
    }

    pub fn value(&self) -> V {
        self.value
    }
}

pub fn constant<V: NodeValue, D: HorizontalDim>(value: V) -> Constant<V, D> {
    Constant::new(value)
}

impl<V: NodeValue, D: HorizontalDim> Expression for Constant<V, D> {
    type Scalar = V::Scalar;
    type Dim = D;
    type Output = V;
    type SlabScratch = ();
    type SharedMemory = ();

    fn space(&self) -> Option<&Arc<Space<V::Scalar, D>>> {
        None
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        Ok(())
    }

    fn max_nodes_per_axis(&self) -> usize {
        0
    }

    fn slab_scratch(&self) -> Result<(), OperatorError> {
        Ok(())
    }

    fn prepare_slab(&self, _slab: SlabIndex, _scratch: &mut ()) {}

    fn slab_node(&self, _node: NodeIndex, _scratch: &()) -> V {
        self.value
    }

    fn shared_memory(&self, _levels_per_block: usize) -> Result<(), OperatorError> {
        Ok(())
    }

    fn resolve_shared(&self, _block: &Block, _shared: &mut ()) {}

    fn block_node(&self, _thread: ThreadIndex, _block: &Block, _shared: &()) -> V {
        self.value
    }
}
