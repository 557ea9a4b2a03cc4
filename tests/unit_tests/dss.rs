use crate::common::{extruded_space, plane_space, smooth_scalar};
use matrixcompare::assert_scalar_eq;
use spectral_elements::dss::weighted_dss;
use spectral_elements::execution::Device;
use spectral_elements::space::NodeIndex;
use spectral_elements::Field;
use std::collections::HashMap;

#[test]
fn continuous_field_is_preserved() {
    let space = plane_space(4, 3);
    let f = Field::from_fn(&space, |g| {
        let x = g.coordinates();
        smooth_scalar(x.x, x.y, x.z)
    });
    let mut g = f.clone();
    weighted_dss(&mut g);

    for (a, b) in f.data().iter().zip(g.data()) {
        assert_scalar_eq!(*a, *b, comp = abs, tol = 1e-12);
    }
}

#[test]
fn shared_nodes_agree_after_summation() {
    let space = extruded_space(3, 2, Device::Serial);
    let layout = *space.layout();
    let topology = space.topology().clone();
    let nq = layout.nq();

    // Element-wise constants are maximally discontinuous across element faces
    let mut f = Field::<f64, _>::zeros(&space);
    for h in 0..layout.num_elements() {
        for v in 0..layout.num_levels() {
            for j in 0..layout.nq_j() {
                for i in 0..nq {
                    f.set(NodeIndex { i, j, v, h }, (h + 1) as f64 * (v + 1) as f64);
                }
            }
        }
    }
    weighted_dss(&mut f);

    for v in 0..layout.num_levels() {
        let mut values: HashMap<usize, f64> = HashMap::new();
        for h in 0..layout.num_elements() {
            for j in 0..layout.nq_j() {
                for i in 0..nq {
                    let value = f.get(NodeIndex { i, j, v, h });
                    let global = topology.global_node(h, i, j, nq);
                    let existing = *values.entry(global).or_insert(value);
                    assert_eq!(existing, value, "Shared node {} differs on level {}", global, v);
                }
            }
        }

        // Interior nodes of an element are owned by that element alone
        let interior = f.get(NodeIndex { i: 1, j: 1, v, h: 2 });
        assert_scalar_eq!(interior, 3.0 * (v + 1) as f64, comp = abs, tol = 1e-13);
    }
}

#[test]
fn corner_value_is_weighted_average() {
    // On a uniform periodic mesh all four elements meeting at a corner carry equal weights
    let space = plane_space(3, 2);
    let layout = *space.layout();
    let mut f = Field::<f64, _>::zeros(&space);
    for h in 0..layout.num_elements() {
        for j in 0..3 {
            for i in 0..3 {
                f.set(NodeIndex { i, j, v: 0, h }, h as f64);
            }
        }
    }
    weighted_dss(&mut f);

    let corner = f.get(NodeIndex { i: 0, j: 0, v: 0, h: 0 });
    assert_scalar_eq!(corner, 1.5, comp = abs, tol = 1e-14);
}
