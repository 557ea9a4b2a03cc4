use crate::common::{
    extruded_line_space, extruded_space, periodic_interval, periodic_square, plane_space, plane_space_on,
    smooth_scalar,
};
use spectral_elements::execution::{Device, ExecutionStrategy, Instantiated};
use spectral_elements::space::{HorizontalDim, SpaceBuilder, Staggering};
use spectral_elements::vector::{Cartesian12Vector, Covariant, Covariant12Vector, Covariant3Vector};
use spectral_elements::{Expression, ExpressionExt, Field, Plane, Space};
use std::sync::Arc;

const STRATEGIES: [ExecutionStrategy; 5] = [
    ExecutionStrategy::Slab { threaded: false },
    ExecutionStrategy::Slab { threaded: true },
    ExecutionStrategy::SharedMemory { levels_per_block: 1 },
    ExecutionStrategy::SharedMemory { levels_per_block: 2 },
    ExecutionStrategy::SharedMemory { levels_per_block: 3 },
];

/// Evaluates the expression built by `make` with every strategy and checks that all results
/// are bitwise identical.
fn assert_strategies_agree<D, E, F>(space: &Arc<Space<f64, D>>, make: F)
where
    D: HorizontalDim,
    E: Expression<Scalar = f64, Dim = D>,
    E::Output: PartialEq,
    F: Fn() -> E,
{
    let reference = Instantiated::with_strategy(make(), space, STRATEGIES[0])
        .unwrap()
        .evaluate()
        .unwrap();
    for strategy in &STRATEGIES[1..] {
        let result = Instantiated::with_strategy(make(), space, *strategy)
            .unwrap()
            .evaluate()
            .unwrap();
        assert_eq!(result.data(), reference.data(), "Strategy {:?} deviates", strategy);
    }
}

fn scalar_field(space: &Arc<Space<f64, Plane>>) -> Field<f64, Plane> {
    Field::from_fn(space, |g| {
        let x = g.coordinates();
        smooth_scalar(x.x, x.y, x.z)
    })
}

fn vector_field(space: &Arc<Space<f64, Plane>>) -> Field<Covariant12Vector<f64>, Plane> {
    Field::from_fn(space, |g| {
        let x = g.coordinates();
        Cartesian12Vector::new(x.y.sin(), (x.x + 0.3 * x.z).cos()).project::<Covariant, _>(g)
    })
}

#[test]
fn strategies_agree_on_nested_operators() {
    for space in [plane_space(4, 3), extruded_space(4, 2, Device::Serial)] {
        let f = scalar_field(&space);
        assert_strategies_agree(&space, || (&f).gradient().divergence());
        assert_strategies_agree(&space, || (&f).weak_gradient().weak_divergence().scaled(2.0));
    }
}

#[test]
fn strategies_agree_on_curls_of_combinations() {
    let space = extruded_space(3, 2, Device::Serial);
    let u = vector_field(&space);
    let f = scalar_field(&space);
    assert_strategies_agree(&space, || (&u).plus((&f).gradient()).weak_curl());
    assert_strategies_agree(&space, || (&u).curl().map(|c| c.u3() * c.u3()));
}

#[test]
fn strategies_agree_across_basis_changes() {
    let topology = periodic_square(2);
    let coarse = SpaceBuilder::new(topology.clone(), 3).build().unwrap();
    let fine = SpaceBuilder::new(topology, 5).build().unwrap();
    let f = scalar_field(&coarse);
    let g = scalar_field(&fine);

    assert_strategies_agree(&fine, || (&f).interpolate(&fine).gradient());
    assert_strategies_agree(&coarse, || (&g).gradient().divergence().restrict(&coarse));
}

#[test]
fn strategies_agree_on_staggered_line_columns() {
    // Five face levels, so blocks of two and three levels leave a partial last block
    let topology = periodic_interval(3);
    let coarse = extruded_line_space(&topology, 3, Staggering::CellFace);
    let fine = extruded_line_space(&topology, 5, Staggering::CellFace);
    assert_eq!(coarse.num_levels(), 5);

    let f = Field::from_fn(&coarse, |g| {
        let x = g.coordinates();
        (2.0 * x.x).sin() * (1.0 + x.z * x.z)
    });
    let w = Field::from_fn(&fine, |g| Covariant3Vector::new(g.coordinates().x.cos() - g.coordinates().z));

    assert_strategies_agree(&coarse, || (&f).gradient().divergence());
    assert_strategies_agree(&coarse, || (&f).weak_gradient().weak_divergence().plus(&f));
    assert_strategies_agree(&fine, || (&f).interpolate(&fine).gradient().divergence());
    assert_strategies_agree(&coarse, || (&w).curl().restrict(&coarse));
    assert_strategies_agree(&coarse, || {
        (&f).interpolate(&fine)
            .gradient()
            .weak_divergence()
            .restrict(&coarse)
    });
}

#[test]
fn accelerator_strategy_is_derived_from_block_size() {
    let space = extruded_space(4, 2, Device::Accelerator { max_threads_per_block: 64 });
    assert_eq!(
        ExecutionStrategy::for_space(&space, 4),
        ExecutionStrategy::SharedMemory { levels_per_block: 4 }
    );
    // Never more levels per block than the space has
    let space = extruded_space(4, 2, Device::accelerator());
    assert_eq!(
        ExecutionStrategy::for_space(&space, 4),
        ExecutionStrategy::SharedMemory { levels_per_block: 5 }
    );

    let serial = plane_space(4, 2);
    assert_eq!(
        ExecutionStrategy::for_space(&serial, 4),
        ExecutionStrategy::Slab { threaded: false }
    );
    let threaded = plane_space_on(&periodic_square(2), 4, Device::Threaded);
    assert_eq!(
        ExecutionStrategy::for_space(&threaded, 4),
        ExecutionStrategy::Slab { threaded: true }
    );
}

#[test]
fn undersized_blocks_still_evaluate() {
    let topology = periodic_square(2);
    let reference_space = plane_space_on(&topology, 4, Device::Serial);
    let small_blocks = plane_space_on(&topology, 4, Device::Accelerator { max_threads_per_block: 4 });

    let f = scalar_field(&reference_space);
    let g = Field::from_data(&small_blocks, f.data().to_vec()).unwrap();

    let expected = Instantiated::new((&f).gradient().divergence(), &reference_space)
        .unwrap()
        .evaluate()
        .unwrap();
    let instantiated = Instantiated::new((&g).gradient().divergence(), &small_blocks).unwrap();
    assert_eq!(
        instantiated.strategy(),
        ExecutionStrategy::SharedMemory { levels_per_block: 1 }
    );
    let result = instantiated.evaluate().unwrap();
    assert_eq!(result.data(), expected.data());
}

#[test]
fn instantiated_expression_can_be_reevaluated() {
    let space = extruded_space(3, 2, Device::accelerator());
    let f = scalar_field(&space);
    let instantiated = Instantiated::new((&f).gradient().divergence(), &space).unwrap();

    let mut output = Field::zeros(&space);
    instantiated.evaluate_into(&mut output).unwrap();
    let first = output.clone();
    instantiated.evaluate_into(&mut output).unwrap();
    assert_eq!(output.data(), first.data());
    assert!(output.data().iter().any(|value| *value != 0.0));
}
