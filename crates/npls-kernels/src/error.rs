//! Error types for N-way PLS kernel operations
//!
//! Kernels fail fast on contract violations (wrong ranks, mismatched
//! dimensions). Numerically degenerate input is never an error here: it
//! propagates as NaN through the missing-data aware routines.

use std::fmt;

/// Error type for kernel operations
#[derive(Debug, Clone, PartialEq)]
pub enum KernelError {
    /// Dimension mismatch between operands
    DimensionMismatch {
        operation: String,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: String,
    },

    /// Invalid mode/axis specification
    InvalidMode {
        mode: usize,
        max_mode: usize,
        context: String,
    },

    /// Factor matrices disagree on their number of components
    ComponentMismatch {
        operation: String,
        expected: usize,
        actual: usize,
        factor_index: usize,
    },

    /// Empty input not allowed
    EmptyInput {
        operation: String,
        parameter: String,
    },

    /// Element count does not fit the requested shape
    IncompatibleShapes {
        operation: String,
        shape_a: Vec<usize>,
        shape_b: Vec<usize>,
        reason: String,
    },
}

impl fmt::Display for KernelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KernelError::DimensionMismatch {
                operation,
                expected,
                actual,
                context,
            } => write!(
                f,
                "{}: dimension mismatch - expected {:?}, got {:?}. {}",
                operation, expected, actual, context
            ),

            KernelError::InvalidMode {
                mode,
                max_mode,
                context,
            } => write!(
                f,
                "Invalid mode {}: must be < {}. {}",
                mode, max_mode, context
            ),

            KernelError::ComponentMismatch {
                operation,
                expected,
                actual,
                factor_index,
            } => write!(
                f,
                "{}: factor {} has {} components, expected {}",
                operation, factor_index, actual, expected
            ),

            KernelError::EmptyInput {
                operation,
                parameter,
            } => write!(
                f,
                "{}: empty input not allowed for parameter '{}'",
                operation, parameter
            ),

            KernelError::IncompatibleShapes {
                operation,
                shape_a,
                shape_b,
                reason,
            } => write!(
                f,
                "{}: incompatible shapes {:?} and {:?}: {}",
                operation, shape_a, shape_b, reason
            ),
        }
    }
}

impl std::error::Error for KernelError {}

/// Result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;

impl KernelError {
    /// Create a dimension mismatch error
    pub fn dimension_mismatch(
        operation: impl Into<String>,
        expected: Vec<usize>,
        actual: Vec<usize>,
        context: impl Into<String>,
    ) -> Self {
        KernelError::DimensionMismatch {
            operation: operation.into(),
            expected,
            actual,
            context: context.into(),
        }
    }

    /// Create an invalid mode error
    pub fn invalid_mode(mode: usize, max_mode: usize, context: impl Into<String>) -> Self {
        KernelError::InvalidMode {
            mode,
            max_mode,
            context: context.into(),
        }
    }

    /// Create a component-count mismatch error
    pub fn component_mismatch(
        operation: impl Into<String>,
        expected: usize,
        actual: usize,
        factor_index: usize,
    ) -> Self {
        KernelError::ComponentMismatch {
            operation: operation.into(),
            expected,
            actual,
            factor_index,
        }
    }

    /// Create an empty input error
    pub fn empty_input(operation: impl Into<String>, parameter: impl Into<String>) -> Self {
        KernelError::EmptyInput {
            operation: operation.into(),
            parameter: parameter.into(),
        }
    }

    /// Create an incompatible shapes error
    pub fn incompatible_shapes(
        operation: impl Into<String>,
        shape_a: Vec<usize>,
        shape_b: Vec<usize>,
        reason: impl Into<String>,
    ) -> Self {
        KernelError::IncompatibleShapes {
            operation: operation.into(),
            shape_a,
            shape_b,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch_display() {
        let err = KernelError::dimension_mismatch(
            "miss_mult",
            vec![4],
            vec![3],
            "Inner dimensions must agree",
        );

        let msg = format!("{}", err);
        assert!(msg.contains("miss_mult"));
        assert!(msg.contains("dimension mismatch"));
        assert!(msg.contains("[4]"));
        assert!(msg.contains("[3]"));
    }

    #[test]
    fn test_invalid_mode_display() {
        let err = KernelError::invalid_mode(3, 3, "Tensor has only 3 modes");

        let msg = format!("{}", err);
        assert!(msg.contains("Invalid mode 3"));
        assert!(msg.contains("must be < 3"));
    }

    #[test]
    fn test_component_mismatch_display() {
        let err = KernelError::component_mismatch("outer_modes", 4, 2, 1);

        let msg = format!("{}", err);
        assert!(msg.contains("outer_modes"));
        assert!(msg.contains("factor 1"));
        assert!(msg.contains("has 2 components"));
        assert!(msg.contains("expected 4"));
    }

    #[test]
    fn test_incompatible_shapes_display() {
        let err = KernelError::incompatible_shapes(
            "refold",
            vec![12],
            vec![2, 5],
            "element count differs",
        );

        let msg = format!("{}", err);
        assert!(msg.contains("refold"));
        assert!(msg.contains("[12]"));
        assert!(msg.contains("[2, 5]"));
    }
}
