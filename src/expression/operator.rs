//! Expression nodes applying spectral operators and basis changes.
use crate::error::OperatorError;
use crate::execution::{Block, ThreadIndex};
use crate::expression::Expression;
use crate::operators::{apply_operator_with, change_basis_with, BasisChange, BasisChangeBuffers, SpectralOperator};
use crate::space::{HorizontalDim, NodeIndex, SlabIndex, Space};
use crate::tensor::contract_row;
use crate::value::NodeValue;
use crate::Real;
use nalgebra::DMatrix;
use std::sync::Arc;

/// A spectral operator applied to an expression.
#[derive(Debug, Clone, Copy)]
pub struct Apply<Op, E> {
    operator: Op,
    argument: E,
}

impl<Op, E> Apply<Op, E> {
    pub fn new(operator: Op, argument: E) -> Self {
        Self { operator, argument }
    }

    pub fn operator(&self) -> &Op {
        &self.operator
    }

    pub fn argument(&self) -> &E {
        &self.argument
    }
}

/// Slab scratch of an operator node: the staged and contracted values of one slab.
#[derive(Debug, Clone)]
pub struct OperatorSlab<S, P, O, T: Real, D: HorizontalDim> {
    argument: S,
    space: Arc<Space<T, D>>,
    staged: Vec<P>,
    output: Vec<O>,
}

/// Shared memory of an operator node: the staged values of every slab of a block.
#[derive(Debug, Clone)]
pub struct OperatorShared<S, P, T: Real, D: HorizontalDim> {
    argument: S,
    space: Arc<Space<T, D>>,
    staged: Vec<P>,
}

impl<Op, E> Apply<Op, E>
where
    E: Expression,
    Op: SpectralOperator<E::Output, E::Dim>,
{
    fn argument_space(&self) -> Result<&Arc<Space<E::Scalar, E::Dim>>, OperatorError> {
        self.argument
            .space()
            .ok_or_else(|| OperatorError::undefined_space(Op::KIND))
    }
}

impl<Op, E> Expression for Apply<Op, E>
where
    E: Expression,
    Op: SpectralOperator<E::Output, E::Dim>,
{
    type Scalar = E::Scalar;
    type Dim = E::Dim;
    type Output = Op::Output;
    type SlabScratch = OperatorSlab<E::SlabScratch, Op::Staged, Op::Output, E::Scalar, E::Dim>;
    type SharedMemory = OperatorShared<E::SharedMemory, Op::Staged, E::Scalar, E::Dim>;

    fn space(&self) -> Option<&Arc<Space<E::Scalar, E::Dim>>> {
        self.argument.space()
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        self.argument.check_spaces()?;
        self.argument_space().map(|_| ())
    }

    fn max_nodes_per_axis(&self) -> usize {
        self.argument.max_nodes_per_axis()
    }

    fn slab_scratch(&self) -> Result<Self::SlabScratch, OperatorError> {
        let space = Arc::clone(self.argument_space()?);
        let n = space.layout().slab_len();
        Ok(OperatorSlab {
            argument: self.argument.slab_scratch()?,
            space,
            staged: vec![<Op::Staged as NodeValue>::zero(); n],
            output: vec![<Op::Output as NodeValue>::zero(); n],
        })
    }

    fn prepare_slab(&self, slab: SlabIndex, scratch: &mut Self::SlabScratch) {
        let OperatorSlab {
            argument,
            space,
            staged,
            output,
        } = scratch;
        self.argument.prepare_slab(slab, argument);
        let argument = &*argument;
        apply_operator_with(
            &self.operator,
            space,
            slab,
            |i, j| self.argument.slab_node(slab.node(i, j), argument),
            staged,
            output,
        );
    }

    fn slab_node(&self, node: NodeIndex, scratch: &Self::SlabScratch) -> Op::Output {
        scratch.output[node.j * scratch.space.nq() + node.i]
    }

    fn shared_memory(&self, levels_per_block: usize) -> Result<Self::SharedMemory, OperatorError> {
        let space = Arc::clone(self.argument_space()?);
        let n = space.layout().slab_len() * levels_per_block;
        Ok(OperatorShared {
            argument: self.argument.shared_memory(levels_per_block)?,
            space,
            staged: vec![<Op::Staged as NodeValue>::zero(); n],
        })
    }

    fn resolve_shared(&self, block: &Block, shared: &mut Self::SharedMemory) {
        let OperatorShared {
            argument,
            space,
            staged,
        } = shared;
        self.argument.resolve_shared(block, argument);
        let argument = &*argument;
        let layout = space.layout();
        block.run_phase(|thread| {
            if block.is_active(thread, layout) {
                let value = self.argument.block_node(thread, block, argument);
                let geometry = space.local_geometry(block.node(thread));
                staged[block.buffer_index(thread, layout)] = self.operator.stage(value, geometry);
            }
        });
    }

    fn block_node(&self, thread: ThreadIndex, block: &Block, shared: &Self::SharedMemory) -> Op::Output {
        let space = &shared.space;
        let n = space.layout().slab_len();
        let slab = &shared.staged[thread.level * n..(thread.level + 1) * n];
        self.operator.contract(
            slab,
            thread.i,
            thread.j,
            space.local_geometry(block.node(thread)),
            space.quadrature().derivative_matrix(),
        )
    }
}

/// A basis change applied to an expression, producing values on the target space.
#[derive(Debug, Clone)]
pub struct Rebased<B, E> {
    change: B,
    argument: E,
}

impl<B, E> Rebased<B, E> {
    pub fn new(change: B, argument: E) -> Self {
        Self { change, argument }
    }
}

#[derive(Debug, Clone)]
pub struct BasisChangeSlab<S, V, T: Real, D: HorizontalDim> {
    argument: S,
    source: Arc<Space<T, D>>,
    matrix: Arc<DMatrix<T>>,
    buffers: BasisChangeBuffers<V>,
}

#[derive(Debug, Clone)]
pub struct BasisChangeShared<S, V, T: Real, D: HorizontalDim> {
    argument: S,
    source: Arc<Space<T, D>>,
    matrix: Arc<DMatrix<T>>,
    staged: Vec<V>,
    /// Results of the contraction along the first axis, only used for quadrilaterals.
    temp: Vec<V>,
}

impl<B, E> Rebased<B, E>
where
    E: Expression,
    B: BasisChange<E::Scalar, E::Dim>,
{
    fn source_space(&self) -> Result<&Arc<Space<E::Scalar, E::Dim>>, OperatorError> {
        self.argument
            .space()
            .ok_or_else(|| OperatorError::undefined_space(B::KIND))
    }
}

impl<B, E> Expression for Rebased<B, E>
where
    E: Expression,
    B: BasisChange<E::Scalar, E::Dim>,
{
    type Scalar = E::Scalar;
    type Dim = E::Dim;
    type Output = E::Output;
    type SlabScratch = BasisChangeSlab<E::SlabScratch, E::Output, E::Scalar, E::Dim>;
    type SharedMemory = BasisChangeShared<E::SharedMemory, E::Output, E::Scalar, E::Dim>;

    fn space(&self) -> Option<&Arc<Space<E::Scalar, E::Dim>>> {
        Some(self.change.target())
    }

    fn check_spaces(&self) -> Result<(), OperatorError> {
        self.argument.check_spaces()?;
        self.change.check_source(self.source_space()?)
    }

    fn max_nodes_per_axis(&self) -> usize {
        self.argument
            .max_nodes_per_axis()
            .max(self.change.target().nq())
    }

    fn slab_scratch(&self) -> Result<Self::SlabScratch, OperatorError> {
        let source = Arc::clone(self.source_space()?);
        let matrix = self.change.matrix(&source)?;
        let buffers = BasisChangeBuffers::new::<E::Dim>(source.nq(), self.change.target().nq());
        Ok(BasisChangeSlab {
            argument: self.argument.slab_scratch()?,
            source,
            matrix: Arc::new(matrix),
            buffers,
        })
    }

    fn prepare_slab(&self, slab: SlabIndex, scratch: &mut Self::SlabScratch) {
        let BasisChangeSlab {
            argument,
            source,
            matrix,
            buffers,
        } = scratch;
        self.argument.prepare_slab(slab, argument);
        let argument = &*argument;
        change_basis_with(
            &self.change,
            &**matrix,
            source,
            slab,
            |i, j| self.argument.slab_node(slab.node(i, j), argument),
            buffers,
        );
    }

    fn slab_node(&self, node: NodeIndex, scratch: &Self::SlabScratch) -> E::Output {
        scratch.buffers.output[node.j * self.change.target().nq() + node.i]
    }

    fn shared_memory(&self, levels_per_block: usize) -> Result<Self::SharedMemory, OperatorError> {
        let source = Arc::clone(self.source_space()?);
        let matrix = self.change.matrix(&source)?;
        let (n_target, n_source) = matrix.shape();
        let staged = source.layout().slab_len() * levels_per_block;
        let temp = if E::Dim::DIM == 2 {
            n_target * n_source * levels_per_block
        } else {
            0
        };
        Ok(BasisChangeShared {
            argument: self.argument.shared_memory(levels_per_block)?,
            source,
            matrix: Arc::new(matrix),
            staged: vec![<E::Output as NodeValue>::zero(); staged],
            temp: vec![<E::Output as NodeValue>::zero(); temp],
        })
    }

    fn resolve_shared(&self, block: &Block, shared: &mut Self::SharedMemory) {
        let BasisChangeShared {
            argument,
            source,
            matrix,
            staged,
            temp,
        } = shared;
        self.argument.resolve_shared(block, argument);
        let argument = &*argument;
        let matrix: &DMatrix<E::Scalar> = matrix;
        let source_layout = source.layout();

        block.run_phase(|thread| {
            if block.is_active(thread, source_layout) {
                let value = self.argument.block_node(thread, block, argument);
                let geometry = source.local_geometry(block.node(thread));
                staged[block.buffer_index(thread, source_layout)] = self.change.stage(value, geometry);
            }
        });

        if E::Dim::DIM == 2 {
            // Thread (i, l) contracts along the first axis for target node i on source row l
            let (n_target, n_source) = matrix.shape();
            let num_levels = source_layout.num_levels();
            let staged = &*staged;
            block.run_phase(|thread| {
                let active = thread.i < n_target && thread.j < n_source && block.first_level() + thread.level < num_levels;
                if active {
                    let base = thread.level * n_source * n_source + thread.j * n_source;
                    temp[thread.level * n_target * n_source + thread.j * n_target + thread.i] =
                        contract_row(matrix, thread.i, |k| staged[base + k]);
                }
            });
        }
    }

    fn block_node(&self, thread: ThreadIndex, block: &Block, shared: &Self::SharedMemory) -> E::Output {
        let matrix = &shared.matrix;
        let (n_target, n_source) = matrix.shape();
        let value = if E::Dim::DIM == 2 {
            let base = thread.level * n_target * n_source;
            contract_row(matrix, thread.j, |l| shared.temp[base + l * n_target + thread.i])
        } else {
            let base = thread.level * n_source;
            contract_row(matrix, thread.i, |k| shared.staged[base + k])
        };
        let geometry = self.change.target().local_geometry(block.node(thread));
        self.change.finish(value, geometry)
    }
}
