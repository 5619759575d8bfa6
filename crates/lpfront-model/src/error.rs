use thiserror::Error;

/// Structural problems detected while building a [`Model`](crate::Model).
///
/// These never reach a backend: builders reject the input before any
/// model exists.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Shape mismatch in {what}: expected {expected}, found {found}")]
    ShapeMismatch {
        what: String,
        expected: usize,
        found: usize,
    },
    #[error("Dimension mismatch: expected {expected} coefficients, found {found}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("Unknown variable index: {0}")]
    UnknownVariable(usize),
    #[error("Invalid bounds for variable {variable}: [{lower}, {upper}]")]
    InvalidBounds {
        variable: usize,
        lower: f64,
        upper: f64,
    },
    #[error("Invalid coefficient: {value}")]
    InvalidCoefficient { value: f64 },
    #[error("Objective already set")]
    ObjectiveAlreadySet,
    #[error("Model has no objective")]
    MissingObjective,
    #[error("Model has no variables")]
    EmptyModel,
}

impl ModelError {
    /// Returns a semantic error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::ShapeMismatch { .. } => "MODEL_SHAPE_MISMATCH",
            ModelError::DimensionMismatch { .. } => "MODEL_DIMENSION_MISMATCH",
            ModelError::UnknownVariable(_) => "VARIABLE_UNKNOWN",
            ModelError::InvalidBounds { .. } => "VARIABLE_INVALID_BOUNDS",
            ModelError::InvalidCoefficient { .. } => "COEFFICIENT_INVALID",
            ModelError::ObjectiveAlreadySet => "OBJECTIVE_ALREADY_SET",
            ModelError::MissingObjective => "OBJECTIVE_MISSING",
            ModelError::EmptyModel => "MODEL_EMPTY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ModelError::ShapeMismatch {
            what: "rhs".to_string(),
            expected: 4,
            found: 3,
        };
        assert_eq!(err.to_string(), "Shape mismatch in rhs: expected 4, found 3");
        assert_eq!(err.code(), "MODEL_SHAPE_MISMATCH");

        let err = ModelError::DimensionMismatch {
            expected: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected 3 coefficients, found 2"
        );
        assert_eq!(ModelError::UnknownVariable(7).to_string(), "Unknown variable index: 7");
    }
}
