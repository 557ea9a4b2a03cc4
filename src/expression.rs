//! Deferred expressions over fields.
//!
//! Expressions are trees of fields, constants, pointwise functions and spectral operators.
//! Building an expression performs no computation; evaluation fuses the whole tree into a single
//! pass over the output space (see [`crate::execution`]).
//!
//! Each node of the tree supports both execution strategies. For slab evaluation, a node first
//! prepares a slab in its scratch storage and then answers queries for individual nodes of that
//! slab. For block evaluation, a node resolves its staged shared memory for a block in one or
//! more phases, after which every logical thread can read its value.
use crate::error::OperatorError;
use crate::execution::{Block, ThreadIndex};
use crate::operators::{
    Curl, CurlInput, Divergence, DivergenceInput, Gradient, GradientInput, Interpolate, Restrict, SpectralOperator,
    WeakCurl, WeakDivergence, WeakGradient,
};
use crate::space::{HorizontalDim, NodeIndex, SlabIndex, Space};
use crate::value::NodeValue;
use crate::Real;
use std::sync::Arc;

mod broadcast;
mod leaf;
mod operator;

pub use broadcast::*;
pub use leaf::*;
pub use operator::*;

/// A deferred computation producing one value of type [`Self::Output`] per node.
pub trait Expression: Sync {
    type Scalar: Real;
    type Dim: HorizontalDim;
    type Output: NodeValue<Scalar = Self::Scalar>;
    /// Per-thread storage for slab evaluation.
    type SlabScratch: Clone + Send + Sync;
    /// Per-thread storage for block evaluation.
    type SharedMemory: Clone + Send + Sync;

    /// The space the expression is defined on, or `None` if it does not involve any field.
    fn space(&self) -> Option<&Arc<Space<Self::Scalar, Self::Dim>>>;

    /// Verifies that all parts of the expression are defined on consistent spaces.
    fn check_spaces(&self) -> Result<(), OperatorError>;

    /// The largest number of nodes per axis of any space in the expression.
    fn max_nodes_per_axis(&self) -> usize;

    fn slab_scratch(&self) -> Result<Self::SlabScratch, OperatorError>;

    /// Prepares the values of the given slab.
    fn prepare_slab(&self, slab: SlabIndex, scratch: &mut Self::SlabScratch);

    /// The value at a node of the most recently prepared slab.
    fn slab_node(&self, node: NodeIndex, scratch: &Self::SlabScratch) -> Self::Output;

    fn shared_memory(&self, levels_per_block: usize) -> Result<Self::SharedMemory, OperatorError>;

    /// Fills the shared memory of the expression for the given block.
    ///
    /// Every phase is run to completion over the whole block before the next one starts.
    fn resolve_shared(&self, block: &Block, shared: &mut Self::SharedMemory);

    /// The value of an active thread of the block, after the block has been resolved.
    fn block_node(&self, thread: ThreadIndex, block: &Block, shared: &Self::SharedMemory) -> Self::Output;
}

/// Combinators for building expressions.
pub trait ExpressionExt: Expression + Sized {
    /// Applies `f` to the value at every node.
    fn map<F, O>(self, f: F) -> Map<Self, F, O>
    where
        F: Fn(Self::Output) -> O + Sync,
        O: NodeValue<Scalar = Self::Scalar>,
    {
        Map::new(self, f)
    }

    /// Combines the values of two expressions node by node.
    fn zip_with<E, F, O>(self, other: E, f: F) -> Zip<Self, E, F, O>
    where
        E: Expression<Scalar = Self::Scalar, Dim = Self::Dim>,
        F: Fn(Self::Output, E::Output) -> O + Sync,
        O: NodeValue<Scalar = Self::Scalar>,
    {
        Zip::new(self, other, f)
    }

    fn plus<E>(self, other: E) -> Combination<Self, E>
    where
        E: Expression<Scalar = Self::Scalar, Dim = Self::Dim, Output = Self::Output>,
    {
        let f: fn(Self::Output, Self::Output) -> Self::Output = NodeValue::combine;
        Zip::new(self, other, f)
    }

    fn minus<E>(self, other: E) -> Combination<Self, E>
    where
        E: Expression<Scalar = Self::Scalar, Dim = Self::Dim, Output = Self::Output>,
    {
        let f: fn(Self::Output, Self::Output) -> Self::Output = NodeValue::difference;
        Zip::new(self, other, f)
    }

    fn scaled(self, factor: Self::Scalar) -> Scaled<Self> {
        Scaled::new(self, factor)
    }

    /// Applies a spectral operator.
    fn apply<Op>(self, operator: Op) -> Apply<Op, Self>
    where
        Op: SpectralOperator<Self::Output, Self::Dim>,
    {
        Apply::new(operator, self)
    }

    fn divergence(self) -> Apply<Divergence, Self>
    where
        Self::Output: DivergenceInput,
    {
        Apply::new(Divergence, self)
    }

    fn weak_divergence(self) -> Apply<WeakDivergence, Self>
    where
        Self::Output: DivergenceInput,
    {
        Apply::new(WeakDivergence, self)
    }

    fn gradient(self) -> Apply<Gradient, Self>
    where
        Self::Output: GradientInput<Self::Dim>,
    {
        Apply::new(Gradient, self)
    }

    fn weak_gradient(self) -> Apply<WeakGradient, Self>
    where
        Self::Output: GradientInput<Self::Dim>,
    {
        Apply::new(WeakGradient, self)
    }

    fn curl(self) -> Apply<Curl, Self>
    where
        Self::Output: CurlInput<Self::Dim>,
    {
        Apply::new(Curl, self)
    }

    fn weak_curl(self) -> Apply<WeakCurl, Self>
    where
        Self::Output: CurlInput<Self::Dim>,
    {
        Apply::new(WeakCurl, self)
    }

    /// Interpolates onto a space on the same mesh with a different number of nodes.
    fn interpolate(self, target: &Arc<Space<Self::Scalar, Self::Dim>>) -> Rebased<Interpolate<Self::Scalar, Self::Dim>, Self> {
        Rebased::new(Interpolate::new(target), self)
    }

    /// Restricts onto a space on the same mesh with at most as many nodes.
    fn restrict(self, target: &Arc<Space<Self::Scalar, Self::Dim>>) -> Rebased<Restrict<Self::Scalar, Self::Dim>, Self> {
        Rebased::new(Restrict::new(target), self)
    }
}

impl<E: Expression> ExpressionExt for E {}

pub fn divergence<E>(expression: E) -> Apply<Divergence, E>
where
    E: Expression,
    E::Output: DivergenceInput,
{
    expression.divergence()
}

pub fn weak_divergence<E>(expression: E) -> Apply<WeakDivergence, E>
where
    E: Expression,
    E::Output: DivergenceInput,
{
    expression.weak_divergence()
}

pub fn gradient<E>(expression: E) -> Apply<Gradient, E>
where
    E: Expression,
    E::Output: GradientInput<E::Dim>,
{
    expression.gradient()
}

pub fn weak_gradient<E>(expression: E) -> Apply<WeakGradient, E>
where
    E: Expression,
    E::Output: GradientInput<E::Dim>,
{
    expression.weak_gradient()
}

pub fn curl<E>(expression: E) -> Apply<Curl, E>
where
    E: Expression,
    E::Output: CurlInput<E::Dim>,
{
    expression.curl()
}

pub fn weak_curl<E>(expression: E) -> Apply<WeakCurl, E>
where
    E: Expression,
    E::Output: CurlInput<E::Dim>,
{
    expression.weak_curl()
}

pub fn interpolate<E: Expression>(
    target: &Arc<Space<E::Scalar, E::Dim>>,
    expression: E,
) -> Rebased<Interpolate<E::Scalar, E::Dim>, E> {
    expression.interpolate(target)
}

pub fn restrict<E: Expression>(
    target: &Arc<Space<E::Scalar, E::Dim>>,
    expression: E,
) -> Rebased<Restrict<E::Scalar, E::Dim>, E> {
    expression.restrict(target)
}
