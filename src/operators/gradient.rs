use crate::geometry::LocalGeometry;
use crate::operators::{OperatorKind, SpectralOperator};
use crate::space::{HorizontalDim, Line, Plane};
use crate::tensor::{contract_column, contract_row};
use crate::value::NodeValue;
use crate::vector::{Covariant12Vector, Covariant1Vector};
use nalgebra::{ComplexField, DMatrix};

/// Values whose horizontal gradient is defined on spaces of dimension `D`.
pub trait GradientInput<D: HorizontalDim>: NodeValue {
    type Gradient: NodeValue<Scalar = Self::Scalar>;

    /// Assembles the gradient from the derivatives along the first two reference axes.
    ///
    /// For line elements the second derivative is zero.
    fn gradient_from_derivatives(derivatives: [Self; 2]) -> Self::Gradient;
}

macro_rules! impl_gradient_input_for_scalar {
    ($($t:ty),*) => {
        $(
            impl GradientInput<Line> for $t {
                type Gradient = Covariant1Vector<$t>;

                fn gradient_from_derivatives([d1, _]: [Self; 2]) -> Self::Gradient {
                    Covariant1Vector::new(d1)
                }
            }

            impl GradientInput<Plane> for $t {
                type Gradient = Covariant12Vector<$t>;

                fn gradient_from_derivatives([d1, d2]: [Self; 2]) -> Self::Gradient {
                    Covariant12Vector::new(d1, d2)
                }
            }
        )*
    };
}

impl_gradient_input_for_scalar!(f32, f64);

impl<D: HorizontalDim, V: GradientInput<D>, const N: usize> GradientInput<D> for [V; N] {
    type Gradient = [V::Gradient; N];

    fn gradient_from_derivatives([d1, d2]: [Self; 2]) -> Self::Gradient {
        std::array::from_fn(|n| V::gradient_from_derivatives([d1[n], d2[n]]))
    }
}

macro_rules! impl_gradient_input_for_tuple {
    ($first:ident $first_idx:tt $(, $name:ident $idx:tt)*) => {
        impl<D: HorizontalDim, $first: GradientInput<D> $(, $name: GradientInput<D, Scalar = $first::Scalar>)*>
            GradientInput<D> for ($first, $($name,)*)
        {
            type Gradient = ($first::Gradient, $($name::Gradient,)*);

            fn gradient_from_derivatives([d1, d2]: [Self; 2]) -> Self::Gradient {
                (
                    $first::gradient_from_derivatives([d1.$first_idx, d2.$first_idx]),
                    $($name::gradient_from_derivatives([d1.$idx, d2.$idx]),)*
                )
            }
        }
    };
}

impl_gradient_input_for_tuple!(A 0, B 1);
impl_gradient_input_for_tuple!(A 0, B 1, C 2);

/// The strong horizontal gradient, in covariant components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gradient;

/// The weak horizontal gradient.
///
/// Evaluated as `-(1/W) Dᵀ (W f)` along each axis, where `W = WJ / J` is the reference
/// quadrature weight. Unlike [`WeakDivergence`](crate::operators::WeakDivergence) and
/// [`WeakCurl`](crate::operators::WeakCurl), which scale by `1/WJ`, the Jacobian is not involved:
/// covariant components are reference-axis derivatives and need no metric factor. After direct
/// stiffness summation the result coincides with the strong gradient for continuous fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeakGradient;

fn reference_derivatives<V: NodeValue, D: HorizontalDim>(
    staged: &[V],
    i: usize,
    j: usize,
    derivative: &DMatrix<V::Scalar>,
    transpose: bool,
) -> [V; 2] {
    let nq = derivative.nrows();
    if transpose {
        let d1 = contract_column(derivative, i, |k| staged[j * nq + k]);
        let d2 = if D::DIM == 2 {
            contract_column(derivative, j, |k| staged[k * nq + i])
        } else {
            V::zero()
        };
        [d1, d2]
    } else {
        let d1 = contract_row(derivative, i, |k| staged[j * nq + k]);
        let d2 = if D::DIM == 2 {
            contract_row(derivative, j, |k| staged[k * nq + i])
        } else {
            V::zero()
        };
        [d1, d2]
    }
}

impl<V: GradientInput<D>, D: HorizontalDim> SpectralOperator<V, D> for Gradient {
    type Output = V::Gradient;
    type Staged = V;

    const KIND: OperatorKind = OperatorKind::Gradient;

    fn stage(&self, value: V, _geometry: &LocalGeometry<V::Scalar>) -> V {
        value
    }

    fn contract(
        &self,
        staged: &[V],
        i: usize,
        j: usize,
        _geometry: &LocalGeometry<V::Scalar>,
        derivative: &DMatrix<V::Scalar>,
    ) -> Self::Output {
        V::gradient_from_derivatives(reference_derivatives::<V, D>(staged, i, j, derivative, false))
    }
}

impl<V: GradientInput<D>, D: HorizontalDim> SpectralOperator<V, D> for WeakGradient {
    type Output = V::Gradient;
    type Staged = V;

    const KIND: OperatorKind = OperatorKind::WeakGradient;

    fn stage(&self, value: V, geometry: &LocalGeometry<V::Scalar>) -> V {
        value.scale(geometry.reference_weight())
    }

    fn contract(
        &self,
        staged: &[V],
        i: usize,
        j: usize,
        geometry: &LocalGeometry<V::Scalar>,
        derivative: &DMatrix<V::Scalar>,
    ) -> Self::Output {
        let factor = -geometry.reference_weight().recip();
        let derivatives = reference_derivatives::<V, D>(staged, i, j, derivative, true);
        V::gradient_from_derivatives(derivatives.map(|d| d.scale(factor)))
    }
}
