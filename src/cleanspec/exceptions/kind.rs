use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of failure categories.
///
/// Every domain error declares exactly one kind. The error handler falls back
/// to the kind when no mapping is registered for the concrete error type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Requested entity is absent.
    NotFound,
    /// Uniqueness or state violation.
    Conflict,
    /// Input shape or business-rule violation.
    ValidationFailed,
    Unauthorized,
    Forbidden,
    /// Malformed predicate or specification construction.
    InvalidSpecification,
    /// A query translator cannot express a predicate.
    UnsupportedOperator,
    /// Unclassified fault. Details are logged, never shown.
    Unexpected,
}

impl ErrorKind {
    pub const ALL: [ErrorKind; 8] = [
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::ValidationFailed,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::InvalidSpecification,
        ErrorKind::UnsupportedOperator,
        ErrorKind::Unexpected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::ValidationFailed => "validation_failed",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidSpecification => "invalid_specification",
            ErrorKind::UnsupportedOperator => "unsupported_operator",
            ErrorKind::Unexpected => "unexpected",
        }
    }

    /// Conventional HTTP status for the kind.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::ValidationFailed => 422,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::InvalidSpecification => 400,
            ErrorKind::UnsupportedOperator => 501,
            ErrorKind::Unexpected => 500,
        }
    }

    /// Whether the error's own message may be shown to callers.
    pub fn is_public(&self) -> bool {
        !matches!(self, ErrorKind::Unexpected)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
