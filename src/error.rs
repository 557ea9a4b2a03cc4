//! Errors raised when expressions are combined, instantiated or evaluated.
use crate::operators::OperatorKind;
use crate::quadrature::QuadratureError;
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum OperatorError {
    /// The arguments of an operation are defined on different spaces.
    MismatchedSpaces {
        operation: String,
        expected: String,
        found: String,
    },
    /// A spectral operator or evaluation was requested for an expression without a space,
    /// such as a constant.
    UndefinedSpace { operation: String },
    /// A basis change between spaces that do not share topology and vertical levels.
    IncompatibleTopology {
        operator: OperatorKind,
        source: String,
        target: String,
    },
    /// Restriction to a space with more nodes per element than the source space.
    InvalidRestriction { source_nodes: usize, target_nodes: usize },
    /// Field data whose length does not match the layout of its space.
    FieldLengthMismatch { expected: usize, found: usize },
    Quadrature(QuadratureError),
}

impl Display for OperatorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::MismatchedSpaces {
                operation,
                expected,
                found,
            } => write!(
                f,
                "Mismatched spaces in {}: expected {}, found {}",
                operation, expected, found
            ),
            Self::UndefinedSpace { operation } => {
                write!(f, "{} requires an expression defined on a space", operation)
            }
            Self::IncompatibleTopology {
                operator,
                source,
                target,
            } => write!(
                f,
                "{} requires spaces on the same mesh, got source {} and target {}",
                operator, source, target
            ),
            Self::InvalidRestriction {
                source_nodes,
                target_nodes,
            } => write!(
                f,
                "Cannot restrict from {} to {} nodes per axis",
                source_nodes, target_nodes
            ),
            Self::FieldLengthMismatch { expected, found } => write!(
                f,
                "Field data has length {}, but the space has {} nodes",
                found, expected
            ),
            Self::Quadrature(err) => write!(f, "Quadrature error: {}", err),
        }
    }
}

impl std::error::Error for OperatorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Quadrature(err) => Some(err),
            _ => None,
        }
    }
}

impl From<QuadratureError> for OperatorError {
    fn from(err: QuadratureError) -> Self {
        Self::Quadrature(err)
    }
}

impl OperatorError {
    pub(crate) fn mismatched_spaces(operation: impl Into<String>, expected: &impl Display, found: &impl Display) -> Self {
        Self::MismatchedSpaces {
            operation: operation.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub(crate) fn undefined_space(operation: impl Display) -> Self {
        Self::UndefinedSpace {
            operation: operation.to_string(),
        }
    }
}
