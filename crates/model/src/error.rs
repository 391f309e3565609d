use std::fmt;

/// Errors raised by the model layer itself: enum parsing and structural
/// validation of definitions. Everything downstream (grading, lifecycle,
/// sync) has its own error type in the engine crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A status/result/context/type string does not name a known variant.
    InvalidEnumValue { kind: String, value: String },
    /// A definition violates a structural invariant (duplicate keys,
    /// duplicate section names, empty code).
    InvalidDefinition { message: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidEnumValue { kind, value } => {
                write!(f, "invalid {} value: '{}'", kind, value)
            }
            ModelError::InvalidDefinition { message } => {
                write!(f, "invalid definition: {}", message)
            }
        }
    }
}

impl std::error::Error for ModelError {}
