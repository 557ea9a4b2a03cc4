//! Spectral differential operators acting on single slabs.
//!
//! Every operator is evaluated in two phases. The first phase *stages* a quantity at each node
//! of the slab, typically the input scaled by a metric term. The second phase *contracts* the
//! staged slab with the one-dimensional derivative matrix at each output node. The execution
//! strategies in [`crate::execution`] only differ in where the staged values are kept, so the
//! arithmetic of each operator is defined once, here.
use crate::geometry::LocalGeometry;
use crate::space::{HorizontalDim, SlabIndex, Space};
use crate::value::NodeValue;
use nalgebra::DMatrix;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

mod curl;
mod divergence;
mod gradient;
mod interpolate;

pub use curl::*;
pub use divergence::*;
pub use gradient::*;
pub use interpolate::*;

/// Identifies an operator, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorKind {
    Divergence,
    WeakDivergence,
    Gradient,
    WeakGradient,
    Curl,
    WeakCurl,
    Interpolate,
    Restrict,
}

impl Display for OperatorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Divergence => "Divergence",
            Self::WeakDivergence => "WeakDivergence",
            Self::Gradient => "Gradient",
            Self::WeakGradient => "WeakGradient",
            Self::Curl => "Curl",
            Self::WeakCurl => "WeakCurl",
            Self::Interpolate => "Interpolate",
            Self::Restrict => "Restrict",
        };
        write!(f, "{}", name)
    }
}

/// A differential operator that maps values of type `V` on a slab to values of type
/// [`Self::Output`] on the same slab.
pub trait SpectralOperator<V: NodeValue, D: HorizontalDim>: Copy + Debug + Send + Sync + 'static {
    type Output: NodeValue<Scalar = V::Scalar>;
    type Staged: NodeValue<Scalar = V::Scalar>;

    const KIND: OperatorKind;

    fn stage(&self, value: V, geometry: &LocalGeometry<V::Scalar>) -> Self::Staged;

    /// Contracts the staged slab into the output value at node `(i, j)`.
    ///
    /// The staged slab is stored with `i` varying fastest. For line elements, `j` is zero.
    fn contract(
        &self,
        staged: &[Self::Staged],
        i: usize,
        j: usize,
        geometry: &LocalGeometry<V::Scalar>,
        derivative: &DMatrix<V::Scalar>,
    ) -> Self::Output;
}

/// The element type produced by applying `Op` to values of type `V`.
pub type OperatorReturn<Op, V, D> = <Op as SpectralOperator<V, D>>::Output;

/// Evaluates the operator on one slab, with the input supplied per node `(i, j)`.
///
/// `staged` and `output` must both hold one value per node of the slab.
pub(crate) fn apply_operator_with<Op, V, D>(
    operator: &Op,
    space: &Space<V::Scalar, D>,
    slab: SlabIndex,
    input: impl Fn(usize, usize) -> V,
    staged: &mut [Op::Staged],
    output: &mut [Op::Output],
) where
    Op: SpectralOperator<V, D>,
    V: NodeValue,
    D: HorizontalDim,
{
    let layout = space.layout();
    let (nq, nq_j) = (layout.nq(), layout.nq_j());
    let geometry = space.slab_geometry(slab);
    let derivative = space.quadrature().derivative_matrix();

    for j in 0..nq_j {
        for i in 0..nq {
            let n = j * nq + i;
            staged[n] = operator.stage(input(i, j), &geometry[n]);
        }
    }

    for j in 0..nq_j {
        for i in 0..nq {
            let n = j * nq + i;
            output[n] = operator.contract(staged, i, j, &geometry[n], derivative);
        }
    }
}

/// Evaluates the operator on the slab `slab` of `space`, given the input values of the slab.
///
/// # Panics
///
/// Panics if the input does not hold exactly one value per node of the slab.
pub fn apply_operator<Op, V, D>(
    operator: &Op,
    space: &Space<V::Scalar, D>,
    slab: SlabIndex,
    input: &[V],
) -> Vec<OperatorReturn<Op, V, D>>
where
    Op: SpectralOperator<V, D>,
    V: NodeValue,
    D: HorizontalDim,
{
    let n = space.layout().slab_len();
    let nq = space.nq();
    assert_eq!(input.len(), n, "Input must hold one value per node of the slab");
    let mut staged = vec![<Op::Staged as NodeValue>::zero(); n];
    let mut output = vec![<Op::Output as NodeValue>::zero(); n];
    apply_operator_with(operator, space, slab, |i, j| input[j * nq + i], &mut staged, &mut output);
    output
}
