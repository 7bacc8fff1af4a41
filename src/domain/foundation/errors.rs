//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Validation failure carrying every violation found, not just the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub code: ErrorCode,
    pub message: String,
    pub errors: Vec<String>,
}

impl ValidationError {
    /// Creates a validation error with no sub-errors.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            errors: Vec::new(),
        }
    }

    /// Creates a validation error with the collected sub-errors.
    pub fn with_errors(message: impl Into<String>, errors: Vec<String>) -> Self {
        Self {
            code: ErrorCode::ValidationFailed,
            message: message.into(),
            errors,
        }
    }

    /// Overrides the error code.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        Self::new(format!("Field '{}' cannot be empty", field.into()))
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        Self::new(format!(
            "Field '{}' must be between {} and {}, got {}",
            field.into(),
            min,
            max,
            actual
        ))
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(format!(
            "Field '{}' has invalid format: {}",
            field.into(),
            reason.into()
        ))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.message, self.errors.join("; "))
        }
    }
}

impl std::error::Error for ValidationError {}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    UnknownMethod,
    InvalidParameters,
    DuplicateRegistration,

    // Computation errors
    MethodFailed,
    UnsupportedNormalization,

    // Infrastructure errors
    InternalError,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::UnknownMethod => "UNKNOWN_METHOD",
            ErrorCode::InvalidParameters => "INVALID_PARAMETERS",
            ErrorCode::DuplicateRegistration => "DUPLICATE_REGISTRATION",
            ErrorCode::MethodFailed => "METHOD_FAILED",
            ErrorCode::UnsupportedNormalization => "UNSUPPORTED_NORMALIZATION",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Errors raised by the decision engine.
///
/// None of these are retried: the same input fails the same way every time,
/// so they travel unchanged to whoever translates them for users.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum McdmError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message} in method '{method}'")]
    Method { method: String, message: String },

    #[error("{message} using method '{method}'")]
    Normalization { method: String, message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl McdmError {
    /// Creates a numerical failure attributed to a named method.
    pub fn method(method: impl Into<String>, message: impl Into<String>) -> Self {
        McdmError::Method {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Creates an unsupported normalization error.
    pub fn normalization(method: impl Into<String>, message: impl Into<String>) -> Self {
        McdmError::Normalization {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Returns the validation payload, if this is a validation failure.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            McdmError::Validation(err) => Some(err),
            _ => None,
        }
    }

    /// Maps the error onto its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            McdmError::Validation(err) => err.code,
            McdmError::Method { .. } => ErrorCode::MethodFailed,
            McdmError::Normalization { .. } => ErrorCode::UnsupportedNormalization,
            McdmError::Internal(_) => ErrorCode::InternalError,
        }
    }
}
