use crate::common::plane_space;
use proptest::prelude::*;
use spectral_elements::integrate::inner_product;
use spectral_elements::proptest::{cartesian12_vector, covariant12_vector, field, node_scalar, scalar_field};
use spectral_elements::vector::{Cartesian12Vector, Covariant12Vector};
use spectral_elements::{evaluate, ExpressionExt, Field, Plane};

type ScalarField = Field<f64, Plane>;

fn scalar_and_vector_fields() -> impl Strategy<Value = (ScalarField, Field<Cartesian12Vector<f64>, Plane>)> {
    let space = plane_space(4, 2);
    (scalar_field(space.clone()), field(space, cartesian12_vector()))
}

fn vector_fields() -> impl Strategy<
    Value = (
        Field<Covariant12Vector<f64>, Plane>,
        Field<Covariant12Vector<f64>, Plane>,
    ),
> {
    let space = plane_space(3, 2);
    (
        field(space.clone(), covariant12_vector()),
        field(space, covariant12_vector()),
    )
}

fn scalar_fields() -> impl Strategy<Value = (ScalarField, ScalarField)> {
    let space = plane_space(4, 2);
    (scalar_field(space.clone()), scalar_field(space))
}

fn assert_close(x: f64, y: f64) -> Result<(), TestCaseError> {
    let scale = 1.0 + x.abs() + y.abs();
    prop_assert!((x - y).abs() <= 1e-9 * scale, "{} != {}", x, y);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn weak_divergence_is_negative_adjoint_of_gradient((f, u) in scalar_and_vector_fields()) {
        let gradient = evaluate((&f).gradient()).unwrap();
        let weak_divergence = evaluate((&u).weak_divergence()).unwrap();

        let lhs: f64 = gradient
            .data()
            .iter()
            .zip(u.data())
            .zip(f.space().geometry())
            .map(|((grad, u), g)| g.weighted_jacobian() * grad.physical_dot(u, g))
            .sum();
        let rhs = inner_product(&f, &weak_divergence);

        let scale = 1.0 + lhs.abs() + rhs.abs();
        prop_assert!((lhs + rhs).abs() <= 1e-9 * scale, "lhs = {}, rhs = {}", lhs, rhs);
    }

    #[test]
    fn divergence_is_linear((u, v) in vector_fields(), a in node_scalar(), b in node_scalar()) {
        let combined = evaluate((&u).scaled(a).plus((&v).scaled(b)).divergence()).unwrap();
        let separate = evaluate((&u).divergence().scaled(a).plus((&v).divergence().scaled(b))).unwrap();

        for (x, y) in combined.data().iter().zip(separate.data()) {
            assert_close(*x, *y)?;
        }
    }

    #[test]
    fn gradient_is_linear((f, g) in scalar_fields(), a in node_scalar(), b in node_scalar()) {
        let combined = evaluate((&f).scaled(a).plus((&g).scaled(b)).gradient()).unwrap();
        let separate = evaluate((&f).gradient().scaled(a).plus((&g).gradient().scaled(b))).unwrap();

        for (x, y) in combined.data().iter().zip(separate.data()) {
            assert_close(x.u1(), y.u1())?;
            assert_close(x.u2(), y.u2())?;
        }
    }

    #[test]
    fn curl_is_linear((u, v) in vector_fields(), a in node_scalar(), b in node_scalar()) {
        let combined = evaluate((&u).scaled(a).plus((&v).scaled(b)).curl()).unwrap();
        let separate = evaluate((&u).curl().scaled(a).plus((&v).curl().scaled(b))).unwrap();

        for (x, y) in combined.data().iter().zip(separate.data()) {
            assert_close(x.u3(), y.u3())?;
        }
    }
}
