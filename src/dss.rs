//! Direct stiffness summation.
//!
//! Spectral operators act element by element, so a field that was continuous before an operator
//! is generally discontinuous afterwards at nodes shared between elements. Weighted direct
//! stiffness summation replaces every shared node value by the `WJ`-weighted average over all
//! elements that share it.
use crate::field::Field;
use crate::space::{HorizontalDim, NodeIndex};
use crate::value::NodeValue;
use nalgebra::ComplexField;
use num::Zero;

/// Averages shared node values, level by level, weighted by `WJ`.
pub fn weighted_dss<V: NodeValue, D: HorizontalDim>(field: &mut Field<V, D>) {
    let space = field.space().clone();
    let layout = *space.layout();
    let topology = space.topology();
    let nq = layout.nq();
    let num_global = topology.num_global_nodes(nq);

    let mut sums = vec![V::zero(); num_global];
    let mut weights = vec![V::Scalar::zero(); num_global];
    let data = field.data_mut();

    for v in 0..layout.num_levels() {
        sums.fill(V::zero());
        weights.fill(V::Scalar::zero());

        for h in 0..layout.num_elements() {
            for j in 0..layout.nq_j() {
                for i in 0..nq {
                    let node = NodeIndex { i, j, v, h };
                    let g = topology.global_node(h, i, j, nq);
                    let wj = space.local_geometry(node).weighted_jacobian();
                    sums[g] = sums[g].scaled_add(wj, data[layout.index(node)]);
                    weights[g] += wj;
                }
            }
        }

        for h in 0..layout.num_elements() {
            for j in 0..layout.nq_j() {
                for i in 0..nq {
                    let node = NodeIndex { i, j, v, h };
                    let g = topology.global_node(h, i, j, nq);
                    data[layout.index(node)] = sums[g].scale(weights[g].recip());
                }
            }
        }
    }
}
