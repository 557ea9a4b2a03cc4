//! Algebra of the values stored at quadrature nodes.
//!
//! Operators never look inside node values directly. Every contraction is expressed in terms
//! of [`NodeValue::scaled_add`], which composite values implement by recursing into their
//! parts. This lets the same kernels act on scalars, axis vectors, arrays and tuples of these.
use crate::Real;
use num::{One, Zero};
use std::fmt::Debug;

/// A small, fixed-size algebraic value that can be stored at a quadrature node.
pub trait NodeValue: Copy + Debug + Send + Sync + 'static {
    /// The underlying floating-point type.
    type Scalar: Real;

    fn zero() -> Self;

    /// Returns `self + alpha * other`.
    fn scaled_add(self, alpha: Self::Scalar, other: Self) -> Self;

    /// Returns `alpha * self`.
    fn scale(self, alpha: Self::Scalar) -> Self {
        Self::zero().scaled_add(alpha, self)
    }

    /// Returns `self + other`.
    fn combine(self, other: Self) -> Self {
        self.scaled_add(Self::Scalar::one(), other)
    }

    /// Returns `self - other`.
    fn difference(self, other: Self) -> Self {
        self.scaled_add(-Self::Scalar::one(), other)
    }

    /// The sum of squares of all scalar entries.
    ///
    /// For axis vectors this is the sum of squared *components*, which is not the physical
    /// norm unless the vector is expressed in a Cartesian basis.
    fn norm_squared(&self) -> Self::Scalar;
}

macro_rules! impl_node_value_for_scalar {
    ($($t:ty),*) => {
        $(
            impl NodeValue for $t {
                type Scalar = $t;

                #[inline]
                fn zero() -> Self {
                    0.0
                }

                #[inline]
                fn scaled_add(self, alpha: Self::Scalar, other: Self) -> Self {
                    self + alpha * other
                }

                #[inline]
                fn norm_squared(&self) -> Self::Scalar {
                    self * self
                }
            }
        )*
    };
}

impl_node_value_for_scalar!(f32, f64);

impl<V: NodeValue, const N: usize> NodeValue for [V; N] {
    type Scalar = V::Scalar;

    fn zero() -> Self {
        [V::zero(); N]
    }

    fn scaled_add(mut self, alpha: Self::Scalar, other: Self) -> Self {
        for (a, b) in self.iter_mut().zip(other) {
            *a = a.scaled_add(alpha, b);
        }
        self
    }

    fn norm_squared(&self) -> Self::Scalar {
        self.iter()
            .fold(Self::Scalar::zero(), |acc, v| acc + v.norm_squared())
    }
}

macro_rules! impl_node_value_for_tuple {
    ($first:ident $first_idx:tt $(, $name:ident $idx:tt)*) => {
        impl<$first: NodeValue $(, $name: NodeValue<Scalar = $first::Scalar>)*> NodeValue for ($first, $($name,)*) {
            type Scalar = $first::Scalar;

            fn zero() -> Self {
                ($first::zero(), $($name::zero(),)*)
            }

            fn scaled_add(self, alpha: Self::Scalar, other: Self) -> Self {
                (
                    self.$first_idx.scaled_add(alpha, other.$first_idx),
                    $(self.$idx.scaled_add(alpha, other.$idx),)*
                )
            }

            fn norm_squared(&self) -> Self::Scalar {
                self.$first_idx.norm_squared() $(+ self.$idx.norm_squared())*
            }
        }
    };
}

impl_node_value_for_tuple!(A 0, B 1);
impl_node_value_for_tuple!(A 0, B 1, C 2);
impl_node_value_for_tuple!(A 0, B 1, C 2, D 3);
