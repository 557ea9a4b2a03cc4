//! Instantiation and evaluation of expressions.
//!
//! An [`Instantiated`] expression owns everything needed to evaluate it into a field
//! repeatedly: the validated expression, the target space, the execution strategy and
//! preallocated per-thread scratch storage. Two strategies are available:
//!
//! - [`ExecutionStrategy::Slab`] evaluates the fused expression slab by slab, optionally
//!   distributing slabs over the rayon thread pool.
//! - [`ExecutionStrategy::SharedMemory`] evaluates blocks of levels of an element with one
//!   logical thread per node, staging the inputs of every operator in block-local buffers
//!   between explicit phases. This mirrors how the computation is organized on accelerators.
//!
//! Both strategies perform the same arithmetic in the same order and produce bit-identical
//! results.
use crate::error::OperatorError;
use crate::expression::Expression;
use crate::field::Field;
use crate::space::{HorizontalDim, Space};
use crate::Real;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::sync::Arc;
use thread_local::ThreadLocal;

mod block;

pub use block::*;

/// The threads per block assumed for accelerators unless configured otherwise.
pub const DEFAULT_MAX_THREADS_PER_BLOCK: usize = 256;

/// The hardware a space is configured to evaluate on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Device {
    /// Sequential evaluation on the calling thread.
    #[default]
    Serial,
    /// Slab-parallel evaluation on the rayon thread pool.
    Threaded,
    /// Block-structured evaluation with staged shared memory.
    Accelerator { max_threads_per_block: usize },
}

impl Device {
    pub fn accelerator() -> Self {
        Self::Accelerator {
            max_threads_per_block: DEFAULT_MAX_THREADS_PER_BLOCK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStrategy {
    Slab { threaded: bool },
    SharedMemory { levels_per_block: usize },
}

impl ExecutionStrategy {
    /// Selects the strategy for evaluating on the device of the given space, with blocks
    /// sized for `nodes_per_axis` threads along each horizontal axis.
    pub fn for_space<T: Real, D: HorizontalDim>(space: &Space<T, D>, nodes_per_axis: usize) -> Self {
        match space.device() {
            Device::Serial => Self::Slab { threaded: false },
            Device::Threaded => Self::Slab { threaded: true },
            Device::Accelerator { max_threads_per_block } => {
                let nodes_j = if D::DIM == 2 { nodes_per_axis } else { 1 };
                let threads_per_level = (nodes_per_axis * nodes_j).max(1);
                if threads_per_level > max_threads_per_block {
                    log::warn!(
                        "Slabs of {} nodes exceed the limit of {} threads per block",
                        threads_per_level,
                        max_threads_per_block
                    );
                }
                let levels_per_block = (max_threads_per_block / threads_per_level)
                    .max(1)
                    .min(space.num_levels());
                Self::SharedMemory { levels_per_block }
            }
        }
    }
}

enum Plan<E: Expression> {
    Slab {
        threaded: bool,
        prototype: E::SlabScratch,
        workspaces: ThreadLocal<RefCell<E::SlabScratch>>,
    },
    SharedMemory {
        levels_per_block: usize,
        threads_per_axis: [usize; 2],
        prototype: E::SharedMemory,
        workspaces: ThreadLocal<RefCell<E::SharedMemory>>,
    },
}

/// An expression bound to an output space, ready for repeated evaluation.
pub struct Instantiated<E: Expression> {
    expression: E,
    space: Arc<Space<E::Scalar, E::Dim>>,
    strategy: ExecutionStrategy,
    plan: Plan<E>,
}

impl<E: Expression> Instantiated<E> {
    /// Validates the expression against the output space and selects the execution strategy
    /// from the device of the space.
    pub fn new(expression: E, space: &Arc<Space<E::Scalar, E::Dim>>) -> Result<Self, OperatorError> {
        let nodes_per_axis = expression.max_nodes_per_axis().max(space.nq());
        let strategy = ExecutionStrategy::for_space(space, nodes_per_axis);
        Self::with_strategy(expression, space, strategy)
    }

    pub fn with_strategy(
        expression: E,
        space: &Arc<Space<E::Scalar, E::Dim>>,
        strategy: ExecutionStrategy,
    ) -> Result<Self, OperatorError> {
        expression.check_spaces()?;
        if let Some(expression_space) = expression.space() {
            if !Space::same(expression_space, space) {
                return Err(OperatorError::mismatched_spaces("instantiation", space, expression_space));
            }
        }

        let plan = match strategy {
            ExecutionStrategy::Slab { threaded } => Plan::Slab {
                threaded,
                prototype: expression.slab_scratch()?,
                workspaces: ThreadLocal::new(),
            },
            ExecutionStrategy::SharedMemory { levels_per_block } => {
                let levels_per_block = levels_per_block.max(1);
                let n = expression.max_nodes_per_axis().max(space.nq());
                let n_j = if E::Dim::DIM == 2 { n } else { 1 };
                Plan::SharedMemory {
                    levels_per_block,
                    threads_per_axis: [n, n_j],
                    prototype: expression.shared_memory(levels_per_block)?,
                    workspaces: ThreadLocal::new(),
                }
            }
        };

        log::debug!("Instantiated expression on {} with strategy {:?}", space, strategy);
        Ok(Self {
            expression,
            space: Arc::clone(space),
            strategy,
            plan,
        })
    }

    pub fn strategy(&self) -> ExecutionStrategy {
        self.strategy
    }

    pub fn space(&self) -> &Arc<Space<E::Scalar, E::Dim>> {
        &self.space
    }

    pub fn expression(&self) -> &E {
        &self.expression
    }

    /// Evaluates the expression into a field on the instantiation space.
    pub fn evaluate_into(&self, output: &mut Field<E::Output, E::Dim>) -> Result<(), OperatorError> {
        if !Space::same(output.space(), &self.space) {
            return Err(OperatorError::mismatched_spaces("assignment", &self.space, output.space()));
        }

        let layout = *self.space.layout();
        let (nq, nq_j) = (layout.nq(), layout.nq_j());
        let expression = &self.expression;

        match &self.plan {
            Plan::Slab {
                threaded,
                prototype,
                workspaces,
            } => {
                let evaluate_slab = |position: usize, values: &mut [E::Output]| {
                    let cell = workspaces.get_or(|| RefCell::new(prototype.clone()));
                    let mut scratch = cell.borrow_mut();
                    let slab = layout.slab_at(position);
                    expression.prepare_slab(slab, &mut scratch);
                    for j in 0..nq_j {
                        for i in 0..nq {
                            values[j * nq + i] = expression.slab_node(slab.node(i, j), &scratch);
                        }
                    }
                };

                let data = output.data_mut();
                if *threaded {
                    data.par_chunks_mut(layout.slab_len())
                        .enumerate()
                        .for_each(|(position, values)| evaluate_slab(position, values));
                } else {
                    data.chunks_mut(layout.slab_len())
                        .enumerate()
                        .for_each(|(position, values)| evaluate_slab(position, values));
                }
            }
            Plan::SharedMemory {
                levels_per_block,
                threads_per_axis,
                prototype,
                workspaces,
            } => {
                let [threads_i, threads_j] = *threads_per_axis;
                output
                    .data_mut()
                    .par_chunks_mut(layout.column_len())
                    .enumerate()
                    .for_each(|(element, column)| {
                        let cell = workspaces.get_or(|| RefCell::new(prototype.clone()));
                        let mut shared = cell.borrow_mut();
                        for first_level in (0..layout.num_levels()).step_by(*levels_per_block) {
                            let block = Block::new(element, first_level, *levels_per_block, threads_i, threads_j);
                            expression.resolve_shared(&block, &mut shared);
                            let shared = &*shared;
                            block.run_phase(|thread| {
                                if block.is_active(thread, &layout) {
                                    let node = block.node(thread);
                                    column[(node.v * nq_j + node.j) * nq + node.i] =
                                        expression.block_node(thread, &block, shared);
                                }
                            });
                        }
                    });
            }
        }

        Ok(())
    }

    /// Evaluates the expression into a newly allocated field.
    pub fn evaluate(&self) -> Result<Field<E::Output, E::Dim>, OperatorError> {
        let mut output = Field::zeros(&self.space);
        self.evaluate_into(&mut output)?;
        Ok(output)
    }
}

/// Evaluates the expression on its own space.
///
/// Fails with [`OperatorError::UndefinedSpace`] if the expression does not involve any field.
pub fn evaluate<E: Expression>(expression: E) -> Result<Field<E::Output, E::Dim>, OperatorError> {
    let space = expression
        .space()
        .cloned()
        .ok_or_else(|| OperatorError::undefined_space("evaluation"))?;
    Instantiated::new(expression, &space)?.evaluate()
}
