//! Vectors tagged with their basis kind and the reference axes they span.
//!
//! An [`AxisVector`] always stores three components, but only the components belonging to its
//! [`Axes`] may be non-zero. The kind ([`Covariant`], [`Contravariant`] or [`Cartesian`]) and the
//! axes are type parameters, so that operator return types can be resolved statically.
use crate::geometry::LocalGeometry;
use crate::value::NodeValue;
use crate::Real;
use nalgebra::{Scalar, Vector3};
use std::fmt;
use std::fmt::Debug;
use std::marker::PhantomData;

/// A subset of the three reference axes.
pub trait Axes: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    const MASK: [bool; 3];
    const NAME: &'static str;
}

macro_rules! declare_axes {
    ($($(#[$attr:meta])* $name:ident => $mask:expr, $label:literal;)*) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
            pub struct $name;

            impl Axes for $name {
                const MASK: [bool; 3] = $mask;
                const NAME: &'static str = $label;
            }
        )*
    };
}

declare_axes! {
    /// The first reference axis.
    Axis1 => [true, false, false], "1";
    /// The second reference axis.
    Axis2 => [false, true, false], "2";
    /// The third (vertical) reference axis.
    Axis3 => [false, false, true], "3";
    Axes12 => [true, true, false], "12";
    Axes13 => [true, false, true], "13";
    Axes23 => [false, true, true], "23";
    Axes123 => [true, true, true], "123";
}

/// Identifies a basis kind at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindId {
    Covariant,
    Contravariant,
    Cartesian,
}

/// The basis in which the components of an [`AxisVector`] are expressed.
pub trait Kind: Copy + Debug + Default + PartialEq + Send + Sync + 'static {
    const ID: KindId;
    const NAME: &'static str;

    fn to_covariant<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T>;
    fn to_contravariant<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T>;
    fn to_cartesian<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T>;
}

/// Components `u_i = (∂x/∂ξ^i) · u`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Covariant;

/// Components `u^i = (∂ξ^i/∂x) · u`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Contravariant;

/// Components in the physical (local Cartesian) basis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cartesian;

impl Kind for Covariant {
    const ID: KindId = KindId::Covariant;
    const NAME: &'static str = "Covariant";

    fn to_covariant<T: Real>(components: &Vector3<T>, _geometry: &LocalGeometry<T>) -> Vector3<T> {
        *components
    }

    fn to_contravariant<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T> {
        let dxi_dx = geometry.dxi_dx();
        dxi_dx * (dxi_dx.transpose() * components)
    }

    fn to_cartesian<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T> {
        geometry.dxi_dx().transpose() * components
    }
}

impl Kind for Contravariant {
    const ID: KindId = KindId::Contravariant;
    const NAME: &'static str = "Contravariant";

    fn to_covariant<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T> {
        let dx_dxi = geometry.dx_dxi();
        dx_dxi.transpose() * (dx_dxi * components)
    }

    fn to_contravariant<T: Real>(components: &Vector3<T>, _geometry: &LocalGeometry<T>) -> Vector3<T> {
        *components
    }

    fn to_cartesian<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T> {
        geometry.dx_dxi() * components
    }
}

impl Kind for Cartesian {
    const ID: KindId = KindId::Cartesian;
    const NAME: &'static str = "Cartesian";

    fn to_covariant<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T> {
        geometry.dx_dxi().transpose() * components
    }

    fn to_contravariant<T: Real>(components: &Vector3<T>, geometry: &LocalGeometry<T>) -> Vector3<T> {
        geometry.dxi_dx() * components
    }

    fn to_cartesian<T: Real>(components: &Vector3<T>, _geometry: &LocalGeometry<T>) -> Vector3<T> {
        *components
    }
}

/// A vector of kind `K` spanning the axes `A`.
#[derive(Clone, Copy, PartialEq)]
pub struct AxisVector<T: Scalar, K, A> {
    components: Vector3<T>,
    marker: PhantomData<(K, A)>,
}

pub type CovariantVector<T, A> = AxisVector<T, Covariant, A>;
pub type ContravariantVector<T, A> = AxisVector<T, Contravariant, A>;
pub type CartesianVector<T, A> = AxisVector<T, Cartesian, A>;

pub type Covariant1Vector<T> = CovariantVector<T, Axis1>;
pub type Covariant2Vector<T> = CovariantVector<T, Axis2>;
pub type Covariant3Vector<T> = CovariantVector<T, Axis3>;
pub type Covariant12Vector<T> = CovariantVector<T, Axes12>;
pub type Covariant13Vector<T> = CovariantVector<T, Axes13>;
pub type Covariant23Vector<T> = CovariantVector<T, Axes23>;
pub type Covariant123Vector<T> = CovariantVector<T, Axes123>;

pub type Contravariant1Vector<T> = ContravariantVector<T, Axis1>;
pub type Contravariant2Vector<T> = ContravariantVector<T, Axis2>;
pub type Contravariant3Vector<T> = ContravariantVector<T, Axis3>;
pub type Contravariant12Vector<T> = ContravariantVector<T, Axes12>;
pub type Contravariant13Vector<T> = ContravariantVector<T, Axes13>;
pub type Contravariant23Vector<T> = ContravariantVector<T, Axes23>;
pub type Contravariant123Vector<T> = ContravariantVector<T, Axes123>;

pub type Cartesian1Vector<T> = CartesianVector<T, Axis1>;
pub type Cartesian12Vector<T> = CartesianVector<T, Axes12>;
pub type Cartesian123Vector<T> = CartesianVector<T, Axes123>;

impl<T: Real, K: Kind, A: Axes> AxisVector<T, K, A> {
    /// Creates a vector from all three components, discarding those outside of `A`.
    pub fn from_components(components: Vector3<T>) -> Self {
        let mut components = components;
        for (c, &present) in components.iter_mut().zip(A::MASK.iter()) {
            if !present {
                *c = T::zero();
            }
        }
        Self {
            components,
            marker: PhantomData,
        }
    }

    pub fn components(&self) -> &Vector3<T> {
        &self.components
    }

    pub fn u1(&self) -> T {
        self.components.x
    }

    pub fn u2(&self) -> T {
        self.components.y
    }

    pub fn u3(&self) -> T {
        self.components.z
    }

    pub fn covariant_components(&self, geometry: &LocalGeometry<T>) -> Vector3<T> {
        K::to_covariant(&self.components, geometry)
    }

    pub fn contravariant_components(&self, geometry: &LocalGeometry<T>) -> Vector3<T> {
        K::to_contravariant(&self.components, geometry)
    }

    pub fn cartesian_components(&self, geometry: &LocalGeometry<T>) -> Vector3<T> {
        K::to_cartesian(&self.components, geometry)
    }

    /// Converts the vector to kind `K2` and projects it onto the axes `A2`.
    pub fn project<K2: Kind, A2: Axes>(&self, geometry: &LocalGeometry<T>) -> AxisVector<T, K2, A2> {
        let components = match K2::ID {
            KindId::Covariant => self.covariant_components(geometry),
            KindId::Contravariant => self.contravariant_components(geometry),
            KindId::Cartesian => self.cartesian_components(geometry),
        };
        AxisVector::from_components(components)
    }

    /// The physical inner product with another vector of any kind.
    pub fn physical_dot<K2: Kind, A2: Axes>(&self, other: &AxisVector<T, K2, A2>, geometry: &LocalGeometry<T>) -> T {
        // Contracting covariant with contravariant components avoids forming the metric
        self.covariant_components(geometry)
            .dot(&other.contravariant_components(geometry))
    }
}

macro_rules! impl_axis_constructor {
    ($axes:ty, ($($arg:ident),+), [$x:expr, $y:expr, $z:expr]) => {
        impl<T: Real, K: Kind> AxisVector<T, K, $axes> {
            pub fn new($($arg: T),+) -> Self {
                Self {
                    components: Vector3::new($x, $y, $z),
                    marker: PhantomData,
                }
            }
        }
    };
}

impl_axis_constructor!(Axis1, (u1), [u1, T::zero(), T::zero()]);
impl_axis_constructor!(Axis2, (u2), [T::zero(), u2, T::zero()]);
impl_axis_constructor!(Axis3, (u3), [T::zero(), T::zero(), u3]);
impl_axis_constructor!(Axes12, (u1, u2), [u1, u2, T::zero()]);
impl_axis_constructor!(Axes13, (u1, u3), [u1, T::zero(), u3]);
impl_axis_constructor!(Axes23, (u2, u3), [T::zero(), u2, u3]);
impl_axis_constructor!(Axes123, (u1, u2, u3), [u1, u2, u3]);

impl<T: Real, K: Kind, A: Axes> Debug for AxisVector<T, K, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}Vector(", K::NAME, A::NAME)?;
        let present = self
            .components
            .iter()
            .zip(A::MASK.iter())
            .filter(|(_, present)| **present)
            .map(|(c, _)| c);
        for (index, c) in present.enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", c)?;
        }
        write!(f, ")")
    }
}

impl<T: Real, K: Kind, A: Axes> NodeValue for AxisVector<T, K, A> {
    type Scalar = T;

    fn zero() -> Self {
        Self {
            components: Vector3::zeros(),
            marker: PhantomData,
        }
    }

    #[inline]
    fn scaled_add(self, alpha: T, other: Self) -> Self {
        Self {
            components: self.components + other.components * alpha,
            marker: PhantomData,
        }
    }

    fn norm_squared(&self) -> T {
        self.components.norm_squared()
    }
}
