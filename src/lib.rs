//! Spectral-element operator evaluation.
//!
//! Fields live on per-element tensor-product grids of Gauss-Lobatto-Legendre nodes. Differential
//! and basis-change operators are composed into deferred [expressions](crate::expression), which
//! are [instantiated](crate::execution::Instantiated) against an output space and then evaluated
//! in a single fused pass, either slab by slab or block by block with staged shared memory.
//!
//! A typical evaluation reads as follows:
//!
//! ```ignore
//! let laplacian = gradient(&f).divergence();
//! let result = evaluate(laplacian)?;
//! ```
use nalgebra::RealField;

pub mod dss;
pub mod error;
pub mod execution;
pub mod expression;
pub mod field;
pub mod geometry;
pub mod integrate;
pub mod operators;
pub mod quadrature;
pub mod space;
pub mod tensor;
pub mod topology;
pub mod value;
pub mod vector;

#[cfg(feature = "proptest")]
pub mod proptest;

pub extern crate nalgebra;

pub use error::OperatorError;
pub use execution::{evaluate, Device, ExecutionStrategy, Instantiated};
pub use expression::{Expression, ExpressionExt};
pub use field::Field;
pub use space::{Line, Plane, Space, SpaceBuilder};
pub use value::NodeValue;

/// Floating-point types usable as the working precision of spaces and fields.
pub trait Real: RealField + Copy {}

impl<T: RealField + Copy> Real for T {}
