use crate::geometry::LocalGeometry;
use crate::operators::{OperatorKind, SpectralOperator};
use crate::space::{HorizontalDim, Line, Plane};
use crate::tensor::{contract_column, contract_row};
use crate::value::NodeValue;
use crate::vector::{
    Axes12, Axes123, Axes23, Axis2, Axis3, AxisVector, Contravariant, Covariant, Covariant123Vector,
};
use crate::Real;
use nalgebra::{ComplexField, DMatrix, Vector3};

/// Covariant vectors whose horizontal curl is defined on spaces of dimension `D`.
///
/// Only the combinations for which the curl is non-trivial are implemented:
///
/// | Horizontal | Input           | Output              |
/// |------------|-----------------|---------------------|
/// | Plane      | `Covariant12`   | `Contravariant3`    |
/// | Plane      | `Covariant3`    | `Contravariant12`   |
/// | Plane      | `Covariant123`  | `Contravariant123`  |
/// | Line       | `Covariant2`    | `Contravariant3`    |
/// | Line       | `Covariant3`    | `Contravariant2`    |
/// | Line       | `Covariant23`   | `Contravariant23`   |
pub trait CurlInput<D: HorizontalDim>: NodeValue {
    type Curl: NodeValue<Scalar = Self::Scalar>;

    fn covariant_vector(&self) -> Covariant123Vector<Self::Scalar>;

    /// Builds the output from all three contravariant curl components.
    fn curl_from_components(components: Vector3<Self::Scalar>) -> Self::Curl;
}

macro_rules! impl_curl_input {
    ($dim:ty: $($input:ty => $output:ty),*) => {
        $(
            impl<T: Real> CurlInput<$dim> for AxisVector<T, Covariant, $input> {
                type Curl = AxisVector<T, Contravariant, $output>;

                fn covariant_vector(&self) -> Covariant123Vector<T> {
                    AxisVector::from_components(*self.components())
                }

                fn curl_from_components(components: Vector3<T>) -> Self::Curl {
                    AxisVector::from_components(components)
                }
            }
        )*
    };
}

impl_curl_input!(Plane: Axes12 => Axis3, Axis3 => Axes12, Axes123 => Axes123);
impl_curl_input!(Line: Axis2 => Axis3, Axis3 => Axis2, Axes23 => Axes23);

/// The strong horizontal curl, in contravariant components.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Curl;

/// The weak horizontal curl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeakCurl;

/// Combines the reference derivatives of the covariant components into the curl, with only
/// horizontal derivatives present.
fn curl_components<T: Real>(d1: &Vector3<T>, d2: &Vector3<T>) -> Vector3<T> {
    Vector3::new(d2.z, -d1.z, d1.y - d2.x)
}

impl<V: CurlInput<D>, D: HorizontalDim> SpectralOperator<V, D> for Curl {
    type Output = V::Curl;
    type Staged = Covariant123Vector<V::Scalar>;

    const KIND: OperatorKind = OperatorKind::Curl;

    fn stage(&self, value: V, _geometry: &LocalGeometry<V::Scalar>) -> Self::Staged {
        value.covariant_vector()
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
        let d1 = contract_row(derivative, i, |k| staged[j * nq + k]);
        let d2 = if D::DIM == 2 {
            contract_row(derivative, j, |k| staged[k * nq + i])
        } else {
            Covariant123Vector::zero()
        };
        let curl = curl_components(d1.components(), d2.components());
        V::curl_from_components(curl * geometry.jacobian().recip())
    }
}

impl<V: CurlInput<D>, D: HorizontalDim> SpectralOperator<V, D> for WeakCurl {
    type Output = V::Curl;
    type Staged = Covariant123Vector<V::Scalar>;

    const KIND: OperatorKind = OperatorKind::WeakCurl;

    fn stage(&self, value: V, geometry: &LocalGeometry<V::Scalar>) -> Self::Staged {
        value.covariant_vector().scale(geometry.reference_weight())
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
        let d1 = contract_column(derivative, i, |k| staged[j * nq + k]);
        let d2 = if D::DIM == 2 {
            contract_column(derivative, j, |k| staged[k * nq + i])
        } else {
            Covariant123Vector::zero()
        };
        let curl = curl_components(d1.components(), d2.components());
        V::curl_from_components(curl * -geometry.weighted_jacobian().recip())
    }
}
