use crate::geometry::LocalGeometry;
use crate::operators::{OperatorKind, SpectralOperator};
use crate::space::HorizontalDim;
use crate::tensor::{contract_column, contract_row};
use crate::value::NodeValue;
use crate::vector::{Axes, AxisVector, Kind};
use crate::Real;
use nalgebra::{ComplexField, DMatrix};

/// Values whose horizontal divergence is defined.
pub trait DivergenceInput: NodeValue {
    type Divergence: NodeValue<Scalar = Self::Scalar>;

    /// The contravariant components along the first two reference axes.
    fn divergence_components(&self, geometry: &LocalGeometry<Self::Scalar>) -> [Self::Divergence; 2];
}

impl<T: Real + NodeValue<Scalar = T>, K: Kind, A: Axes> DivergenceInput for AxisVector<T, K, A> {
    type Divergence = T;

    fn divergence_components(&self, geometry: &LocalGeometry<T>) -> [T; 2] {
        let u = AxisVector::contravariant_components(self, geometry);
        [u.x, u.y]
    }
}

impl<V: DivergenceInput, const N: usize> DivergenceInput for [V; N] {
    type Divergence = [V::Divergence; N];

    fn divergence_components(&self, geometry: &LocalGeometry<V::Scalar>) -> [Self::Divergence; 2] {
        let parts = self.map(|v| v.divergence_components(geometry));
        [parts.map(|p| p[0]), parts.map(|p| p[1])]
    }
}

macro_rules! impl_divergence_input_for_tuple {
    ($first:ident $first_idx:tt $(, $name:ident $idx:tt)*) => {
        impl<$first: DivergenceInput $(, $name: DivergenceInput<Scalar = $first::Scalar>)*> DivergenceInput
            for ($first, $($name,)*)
        {
            type Divergence = ($first::Divergence, $($name::Divergence,)*);

            fn divergence_components(&self, geometry: &LocalGeometry<Self::Scalar>) -> [Self::Divergence; 2] {
                let parts = (
                    self.$first_idx.divergence_components(geometry),
                    $(self.$idx.divergence_components(geometry),)*
                );
                [
                    (parts.$first_idx[0], $(parts.$idx[0],)*),
                    (parts.$first_idx[1], $(parts.$idx[1],)*),
                ]
            }
        }
    };
}

impl_divergence_input_for_tuple!(A 0, B 1);
impl_divergence_input_for_tuple!(A 0, B 1, C 2);

/// The strong horizontal divergence `(1/J) sum_i ∂_i (J u^i)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Divergence;

/// The weak horizontal divergence, the negative adjoint of the gradient under the discrete
/// inner product weighted by `WJ`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeakDivergence;

impl<V: DivergenceInput, D: HorizontalDim> SpectralOperator<V, D> for Divergence {
    type Output = V::Divergence;
    type Staged = [V::Divergence; 2];

    const KIND: OperatorKind = OperatorKind::Divergence;

    fn stage(&self, value: V, geometry: &LocalGeometry<V::Scalar>) -> Self::Staged {
        let jacobian = geometry.jacobian();
        value
            .divergence_components(geometry)
            .map(|u| u.scale(jacobian))
    }

    fn contract(
        &self,
        staged: &[Self::Staged],
        i: usize,
        j: usize,
        geometry: &LocalGeometry<V::Scalar>,
        derivative: &DMatrix<V::Scalar>,
    ) -> Self::Output {
        let nq = derivative.nrows();
        let mut divergence = contract_row(derivative, i, |k| staged[j * nq + k][0]);
        if D::DIM == 2 {
            divergence = divergence.combine(contract_row(derivative, j, |k| staged[k * nq + i][1]));
        }
        divergence.scale(geometry.jacobian().recip())
    }
}

impl<V: DivergenceInput, D: HorizontalDim> SpectralOperator<V, D> for WeakDivergence {
    type Output = V::Divergence;
    type Staged = [V::Divergence; 2];

    const KIND: OperatorKind = OperatorKind::WeakDivergence;

    fn stage(&self, value: V, geometry: &LocalGeometry<V::Scalar>) -> Self::Staged {
        let wj = geometry.weighted_jacobian();
        value
            .divergence_components(geometry)
            .map(|u| u.scale(wj))
    }

    fn contract(
        &self,
        staged: &[Self::Staged],
        i: usize,
        j: usize,
        geometry: &LocalGeometry<V::Scalar>,
        derivative: &DMatrix<V::Scalar>,
    ) -> Self::Output {
        let nq = derivative.nrows();
        let mut divergence = contract_column(derivative, i, |k| staged[j * nq + k][0]);
        if D::DIM == 2 {
            divergence = divergence.combine(contract_column(derivative, j, |k| staged[k * nq + i][1]));
        }
        divergence.scale(-geometry.weighted_jacobian().recip())
    }
}
