use crate::error::OperatorError;
use crate::geometry::LocalGeometry;
use crate::operators::OperatorKind;
use crate::space::{HorizontalDim, SlabIndex, Space};
use crate::tensor::{tensor_product_1d, tensor_product_2d};
use crate::value::NodeValue;
use crate::Real;
use nalgebra::DMatrix;
use std::fmt::Debug;
use std::sync::Arc;

/// A change of basis between two spaces on the same mesh with different numbers of nodes.
///
/// The change is applied as a tensor product of a one-dimensional matrix, enclosed by a
/// pointwise staging step on the source nodes and a pointwise finishing step on the target
/// nodes.
pub trait BasisChange<T: Real, D: HorizontalDim>: Clone + Debug + Send + Sync {
    const KIND: OperatorKind;

    fn target(&self) -> &Arc<Space<T, D>>;

    /// Verifies that the change is well-defined from the given source space.
    fn check_source(&self, source: &Space<T, D>) -> Result<(), OperatorError>;

    /// The `m x n` matrix mapping `n` source nodes to `m` target nodes along one axis.
    fn matrix(&self, source: &Space<T, D>) -> Result<DMatrix<T>, OperatorError>;

    fn stage<V: NodeValue<Scalar = T>>(&self, value: V, source: &LocalGeometry<T>) -> V;

    fn finish<V: NodeValue<Scalar = T>>(&self, value: V, target: &LocalGeometry<T>) -> V;
}

fn check_same_mesh<T: Real, D: HorizontalDim>(
    kind: OperatorKind,
    source: &Space<T, D>,
    target: &Space<T, D>,
) -> Result<(), OperatorError> {
    if source.shares_mesh_with(target) {
        Ok(())
    } else {
        Err(OperatorError::IncompatibleTopology {
            operator: kind,
            source: source.to_string(),
            target: target.to_string(),
        })
    }
}

/// Evaluates the polynomial interpolant of the source field at the nodes of the target space.
#[derive(Debug, Clone)]
pub struct Interpolate<T: Real, D: HorizontalDim> {
    target: Arc<Space<T, D>>,
}

impl<T: Real, D: HorizontalDim> Interpolate<T, D> {
    pub fn new(target: &Arc<Space<T, D>>) -> Self {
        Self {
            target: Arc::clone(target),
        }
    }
}

impl<T: Real, D: HorizontalDim> BasisChange<T, D> for Interpolate<T, D> {
    const KIND: OperatorKind = OperatorKind::Interpolate;

    fn target(&self) -> &Arc<Space<T, D>> {
        &self.target
    }

    fn check_source(&self, source: &Space<T, D>) -> Result<(), OperatorError> {
        check_same_mesh(Self::KIND, source, &self.target)
    }

    fn matrix(&self, source: &Space<T, D>) -> Result<DMatrix<T>, OperatorError> {
        Ok(source
            .quadrature()
            .interpolation_matrix_to(self.target.quadrature())?)
    }

    fn stage<V: NodeValue<Scalar = T>>(&self, value: V, _source: &LocalGeometry<T>) -> V {
        value
    }

    fn finish<V: NodeValue<Scalar = T>>(&self, value: V, _target: &LocalGeometry<T>) -> V {
        value
    }
}

/// Projects the source field onto a space with at most as many nodes per element.
///
/// This is the adjoint of [`Interpolate`] under the `WJ`-weighted inner products of the two
/// spaces.
#[derive(Debug, Clone)]
pub struct Restrict<T: Real, D: HorizontalDim> {
    target: Arc<Space<T, D>>,
}

impl<T: Real, D: HorizontalDim> Restrict<T, D> {
    pub fn new(target: &Arc<Space<T, D>>) -> Self {
        Self {
            target: Arc::clone(target),
        }
    }
}

impl<T: Real, D: HorizontalDim> BasisChange<T, D> for Restrict<T, D> {
    const KIND: OperatorKind = OperatorKind::Restrict;

    fn target(&self) -> &Arc<Space<T, D>> {
        &self.target
    }

    fn check_source(&self, source: &Space<T, D>) -> Result<(), OperatorError> {
        check_same_mesh(Self::KIND, source, &self.target)?;
        if self.target.nq() > source.nq() {
            return Err(OperatorError::InvalidRestriction {
                source_nodes: source.nq(),
                target_nodes: self.target.nq(),
            });
        }
        Ok(())
    }

    fn matrix(&self, source: &Space<T, D>) -> Result<DMatrix<T>, OperatorError> {
        let interpolation = self
            .target
            .quadrature()
            .interpolation_matrix_to(source.quadrature())?;
        Ok(interpolation.transpose())
    }

    fn stage<V: NodeValue<Scalar = T>>(&self, value: V, source: &LocalGeometry<T>) -> V {
        value.scale(source.weighted_jacobian())
    }

    fn finish<V: NodeValue<Scalar = T>>(&self, value: V, target: &LocalGeometry<T>) -> V {
        value.scale(target.weighted_jacobian().recip())
    }
}

/// Buffers for one slab of a basis change.
#[derive(Debug, Clone)]
pub(crate) struct BasisChangeBuffers<V> {
    pub staged: Vec<V>,
    pub temp: Vec<V>,
    pub output: Vec<V>,
}

impl<V: NodeValue> BasisChangeBuffers<V> {
    pub fn new<D: HorizontalDim>(n_source: usize, n_target: usize) -> Self {
        let (staged, temp, output) = if D::DIM == 2 {
            (n_source * n_source, n_target * n_source, n_target * n_target)
        } else {
            (n_source, 0, n_target)
        };
        Self {
            staged: vec![V::zero(); staged],
            temp: vec![V::zero(); temp],
            output: vec![V::zero(); output],
        }
    }
}

/// Applies the basis change to one slab, with the source values supplied per node `(i, j)`.
///
/// The result is left in `buffers.output`, in slab order of the target space.
pub(crate) fn change_basis_with<B, V, D>(
    change: &B,
    matrix: &DMatrix<V::Scalar>,
    source: &Space<V::Scalar, D>,
    slab: SlabIndex,
    input: impl Fn(usize, usize) -> V,
    buffers: &mut BasisChangeBuffers<V>,
) where
    B: BasisChange<V::Scalar, D>,
    V: NodeValue,
    D: HorizontalDim,
{
    let (n_source, n_source_j) = (source.layout().nq(), source.layout().nq_j());
    let source_geometry = source.slab_geometry(slab);
    for j in 0..n_source_j {
        for i in 0..n_source {
            let n = j * n_source + i;
            buffers.staged[n] = change.stage(input(i, j), &source_geometry[n]);
        }
    }

    if D::DIM == 2 {
        tensor_product_2d(matrix, &buffers.staged, &mut buffers.temp, &mut buffers.output);
    } else {
        tensor_product_1d(matrix, &buffers.staged, &mut buffers.output);
    }

    let target_geometry = change.target().slab_geometry(slab);
    for (value, geometry) in buffers.output.iter_mut().zip(target_geometry) {
        *value = change.finish(*value, geometry);
    }
}

/// Applies the basis change to the slab `slab` of `source`, given the source values of the slab.
///
/// Returns the values on the corresponding slab of the target space.
pub fn apply_basis_change<B, V, D>(
    change: &B,
    source: &Space<V::Scalar, D>,
    slab: SlabIndex,
    input: &[V],
) -> Result<Vec<V>, OperatorError>
where
    B: BasisChange<V::Scalar, D>,
    V: NodeValue,
    D: HorizontalDim,
{
    change.check_source(source)?;
    assert_eq!(
        input.len(),
        source.layout().slab_len(),
        "Input must hold one value per node of the slab"
    );
    let matrix = change.matrix(source)?;
    let nq = source.nq();
    let mut buffers = BasisChangeBuffers::new::<D>(nq, change.target().nq());
    change_basis_with(change, &matrix, source, slab, |i, j| input[j * nq + i], &mut buffers);
    Ok(buffers.output)
}
