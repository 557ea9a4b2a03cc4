//! Pointwise combinations of expressions.
use crate::error::OperatorError;
use crate::execution::{Block, ThreadIndex};
use crate::expression::Expression;
use crate::space::{NodeIndex, SlabIndex, Space};
use crate::value::NodeValue;
use std::marker::PhantomData;
use std::sync::Arc;

/// Applies a function to the value of an expression at every node.
pub struct Map<E, F, O> {
    expression: E,
    f: F,
    marker: PhantomData<fn() -> O>,
}

impl<E, F, O> Map<E, F, O> {
    pub fn new(expression: E, f: F) -> Self {
        Self {
            expression,
            f,
            marker: PhantomData,
        }
    }
}

impl<E, F, O> Expression for Map<E, F, O>
where
    E: Expression,
    F: Fn(E::Output) -> O + Sync,
    O: NodeValue<Scalar = E::Scalar>,
{
    type Scalar = E::Scalar;
    type Dim = E::Dim;
    type Output = O;
    type SlabScratch = E::SlabScratch;
    type SharedMemory = E::SharedMemory;

    fn space(&self) -> Option<&Arc<Space<E::Scalar, E::Dim>>> {
        self.expression.space()
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        self.expression.check_spaces()
    }

    fn max_nodes_per_axis(&self) -> usize {
        self.expression.max_nodes_per_axis()
    }

    fn slab_scratch(&self) -> Result<Self::SlabScratch, OperatorError> {
        self.expression.slab_scratch()
    }

    fn prepare_slab(&self, slab: SlabIndex, scratch: &mut Self::SlabScratch) {
        self.expression.prepare_slab(slab, scratch)
    }

    fn slab_node(&self, node: NodeIndex, scratch: &Self::SlabScratch) -> O {
        (self.f)(self.expression.slab_node(node, scratch))
    }

    fn shared_memory(&self, levels_per_block: usize) -> Result<Self::SharedMemory, OperatorError> {
        self.expression.shared_memory(levels_per_block)
    }

    fn resolve_shared(&self, block: &Block, shared: &mut Self::SharedMemory) {
        self.expression.resolve_shared(block, shared)
    }

    fn block_node(&self, thread: ThreadIndex, block: &Block, shared: &Self::SharedMemory) -> O {
        (self.f)(self.expression.block_node(thread, block, shared))
    }
}

/// Multiplies the value of an expression by a scalar at every node.
#[derive(Debug, Clone, Copy)]
pub struct Scaled<E: Expression> {
    expression: E,
    factor: E::Scalar,
}

impl<E: Expression> Scaled<E> {
    pub fn new(expression: E, factor: E::Scalar) -> Self {
        Self { expression, factor }
    }
}

impl<E: Expression> Expression for Scaled<E> {
    type Scalar = E::Scalar;
    type Dim = E::Dim;
    type Output = E::Output;
    type SlabScratch = E::SlabScratch;
    type SharedMemory = E::SharedMemory;

    fn space(&self) -> Option<&Arc<Space<E::Scalar, E::Dim>>> {
        self.expression.space()
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        self.expression.check_spaces()
    }

    fn max_nodes_per_axis(&self) -> usize {
        self.expression.max_nodes_per_axis()
    }

    fn slab_scratch(&self) -> Result<Self::SlabScratch, OperatorError> {
        self.expression.slab_scratch()
    }

    fn prepare_slab(&self, slab: SlabIndex, scratch: &mut Self::SlabScratch) {
        self.expression.prepare_slab(slab, scratch)
    }

    fn slab_node(&self, node: NodeIndex, scratch: &Self::SlabScratch) -> E::Output {
        self.expression.slab_node(node, scratch).scale(self.factor)
    }

    fn shared_memory(&self, levels_per_block: usize) -> Result<Self::SharedMemory, OperatorError> {
        self.expression.shared_memory(levels_per_block)
    }

    fn resolve_shared(&self, block: &Block, shared: &mut Self::SharedMemory) {
        self.expression.resolve_shared(block, shared)
    }

    fn block_node(&self, thread: ThreadIndex, block: &Block, shared: &Self::SharedMemory) -> E::Output {
        self.expression
            .block_node(thread, block, shared)
            .scale(self.factor)
    }
}

/// Combines the values of two expressions on the same space at every node.
pub struct Zip<A, B, F, O> {
    a: A,
    b: B,
    f: F,
    marker: PhantomData<fn() -> O>,
}

/// The sum or difference of two expressions.
pub type Combination<A, B> = Zip<
    A,
    B,
    fn(<A as Expression>::Output, <A as Expression>::Output) -> <A as Expression>::Output,
    <A as Expression>::Output,
>;

impl<A, B, F, O> Zip<A, B, F, O> {
    pub fn new(a: A, b: B, f: F) -> Self {
        Self {
            a,
            b,
            f,
            marker: PhantomData,
        }
    }
}

impl<A, B, F, O> Expression for Zip<A, B, F, O>
where
    A: Expression,
    B: Expression<Scalar = A::Scalar, Dim = A::Dim>,
    F: Fn(A::Output, B::Output) -> O + Sync,
    O: NodeValue<Scalar = A::Scalar>,
{
    type Scalar = A::Scalar;
    type Dim = A::Dim;
    type Output = O;
    type SlabScratch = (A::SlabScratch, B::SlabScratch);
    type SharedMemory = (A::SharedMemory, B::SharedMemory);

    fn space(&self) -> Option<&Arc<Space<A::Scalar, A::Dim>>> {
        self.a.space().or_else(|| self.b.space())
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        self.a.check_spaces()?;
        self.b.check_spaces()?;
        match (self.a.space(), self.b.space()) {
            (Some(a), Some(b)) if !Space::same(a, b) => Err(OperatorError::mismatched_spaces("zip_with", a, b)),
            _ => Ok(()),
        }
    }

    fn max_nodes_per_axis(&self) -> usize {
        self.a.max_nodes_per_axis().max(self.b.max_nodes_per_axis())
    }

    fn slab_scratch(&self) -> Result<Self::SlabScratch, OperatorError> {
        Ok((self.a.slab_scratch()?, self.b.slab_scratch()?))
    }

    fn prepare_slab(&self, slab: SlabIndex, (a, b): &mut (A::SlabScratch, B::SlabScratch)) {
        self.a.prepare_slab(slab, a);
        self.b.prepare_slab(slab, b);
    }

    fn slab_node(&self, node: NodeIndex, (a, b): &(A::SlabScratch, B::SlabScratch)) -> O {
        (self.f)(self.a.slab_node(node, a), self.b.slab_node(node, b))
    }

    fn shared_memory(&self, levels_per_block: usize) -> Result<Self::SharedMemory, OperatorError> {
        Ok((
            self.a.shared_memory(levels_per_block)?,
            self.b.shared_memory(levels_per_block)?,
        ))
    }

    fn resolve_shared(&self, block: &Block, (a, b): &mut (A::SharedMemory, B::SharedMemory)) {
        self.a.resolve_shared(block, a);
        self.b.resolve_shared(block, b);
    }

    fn block_node(&self, thread: ThreadIndex, block: &Block, (a, b): &(A::SharedMemory, B::SharedMemory)) -> O {
        (self.f)(self.a.block_node(thread, block, a), self.b.block_node(thread, block, b))
    }
}
