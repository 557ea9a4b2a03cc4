//! Per-node metric information of the element maps.
use crate::quadrature::SpectralQuadrature;
use crate::Real;
use eyre::eyre;
use nalgebra::{Matrix3, Point3, Scalar, Vector3};
use serde::{Deserialize, Serialize};

/// Metric terms of the element map at a single quadrature node.
///
/// The reference coordinates are `ξ = (ξ¹, ξ², ξ³)`, where `ξ³` is the vertical axis. Reference
/// axes that a space does not span are mapped by the identity, except for the vertical axis of an
/// extruded space, which is scaled by the thickness of the level. The stored quantities are
/// consistent with each other by construction:
///
/// - `jacobian` is `det(∂x/∂ξ)` and is strictly positive,
/// - `dxi_dx` is the inverse of `dx_dxi`,
/// - `weighted_jacobian` is the reference quadrature weight times `jacobian`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalGeometry<T: Scalar> {
    coordinates: Point3<T>,
    jacobian: T,
    weighted_jacobian: T,
    dx_dxi: Matrix3<T>,
    dxi_dx: Matrix3<T>,
}

impl<T: Real> LocalGeometry<T> {
    /// Assembles the metric terms from the coordinates, the Jacobian matrix `∂x/∂ξ` and the
    /// tensor-product reference weight of the node.
    ///
    /// Fails if the Jacobian determinant is not strictly positive, which indicates an inverted
    /// or degenerate element.
    pub fn new(coordinates: Point3<T>, dx_dxi: Matrix3<T>, reference_weight: T) -> eyre::Result<Self> {
        let jacobian = dx_dxi.determinant();
        if !(jacobian > T::zero()) {
            return Err(eyre!(
                "Non-positive Jacobian determinant {:?} encountered at {:?}",
                jacobian,
                coordinates
            ));
        }
        let dxi_dx = dx_dxi
            .try_inverse()
            .ok_or_else(|| eyre!("Singular element Jacobian encountered"))?;
        Ok(Self {
            coordinates,
            jacobian,
            weighted_jacobian: reference_weight * jacobian,
            dx_dxi,
            dxi_dx,
        })
    }

    pub fn coordinates(&self) -> &Point3<T> {
        &self.coordinates
    }

    /// The Jacobian determinant `J`.
    pub fn jacobian(&self) -> T {
        self.jacobian
    }

    /// The quadrature weight times the Jacobian determinant, `WJ`.
    pub fn weighted_jacobian(&self) -> T {
        self.weighted_jacobian
    }

    /// The reference quadrature weight `W = WJ / J`.
    pub fn reference_weight(&self) -> T {
        self.weighted_jacobian / self.jacobian
    }

    /// The Jacobian matrix `∂x/∂ξ`, with column `i` holding the derivative along `ξⁱ`.
    pub fn dx_dxi(&self) -> &Matrix3<T> {
        &self.dx_dxi
    }

    pub fn dxi_dx(&self) -> &Matrix3<T> {
        &self.dxi_dx
    }
}

/// Computes the geometry of all nodes of a slab from the physical coordinates of its nodes.
///
/// The coordinates are given in slab order, that is node `(i, j)` is stored at `j * nq + i`,
/// where `nq_j` is either one (line elements) or `nq` (quadrilateral elements). Horizontal
/// derivatives of the coordinates are obtained by applying the spectral differentiation matrix,
/// so that curved elements are represented to the order of the basis. The vertical column of
/// the Jacobian matrix is `(0, 0, thickness)`.
pub(crate) fn compute_slab_geometry<T: Real>(
    coordinates: &[Point3<T>],
    quadrature: &SpectralQuadrature<T>,
    nq_j: usize,
    thickness: T,
) -> eyre::Result<Vec<LocalGeometry<T>>> {
    let nq = quadrature.num_points();
    assert_eq!(coordinates.len(), nq * nq_j, "Coordinate count must match slab size");
    let d = quadrature.derivative_matrix();
    let w = quadrature.weights();

    let mut geometry = Vec::with_capacity(coordinates.len());
    for j in 0..nq_j {
        for i in 0..nq {
            let mut dx_dxi = Matrix3::identity();

            let mut d1 = Vector3::zeros();
            for k in 0..nq {
                d1 += coordinates[j * nq + k].coords * d[(i, k)];
            }
            dx_dxi.set_column(0, &d1);

            let mut weight = w[i];
            if nq_j > 1 {
                let mut d2 = Vector3::zeros();
                for k in 0..nq {
                    d2 += coordinates[k * nq + i].coords * d[(j, k)];
                }
                dx_dxi.set_column(1, &d2);
                weight *= w[j];
            }

            dx_dxi.set_column(2, &Vector3::new(T::zero(), T::zero(), thickness));
            geometry.push(LocalGeometry::new(coordinates[j * nq + i], dx_dxi, weight)?);
        }
    }

    Ok(geometry)
}
