use crate::exceptions::{DomainError, DomainTag, ErrorDomain, ErrorKind};
use crate::handler::MapperKey;
use crate::spec::{FieldType, Operator};
use serde_json::{json, Map, Value as JsonValue};
use thiserror::Error;

/// Failures while building or translating a specification.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpecificationError {
    #[error("invalid predicate on `{field}`: {operator} expects {expected}, got {found}")]
    InvalidPredicate {
        field: &'static str,
        operator: Operator,
        expected: &'static str,
        found: &'static str,
    },

    #[error("{operator} does not apply to `{field}` ({field_type})")]
    OperatorNotApplicable {
        field: &'static str,
        operator: Operator,
        field_type: FieldType,
    },

    #[error("`{combinator}` needs at least one specification")]
    EmptyCombinator { combinator: &'static str },

    #[error("{backend} cannot express the {operator} operator")]
    UnsupportedOperator {
        backend: &'static str,
        operator: Operator,
    },
}

impl ErrorDomain for SpecificationError {
    const TAG: DomainTag = DomainTag::new("specification");
    const KINDS: &'static [ErrorKind] = &[
        ErrorKind::InvalidSpecification,
        ErrorKind::UnsupportedOperator,
    ];
}

impl DomainError for SpecificationError {
    fn kind(&self) -> ErrorKind {
        match self {
            SpecificationError::InvalidPredicate { .. }
            | SpecificationError::OperatorNotApplicable { .. }
            | SpecificationError::EmptyCombinator { .. } => ErrorKind::InvalidSpecification,
            SpecificationError::UnsupportedOperator { .. } => ErrorKind::UnsupportedOperator,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            SpecificationError::InvalidPredicate { .. } => "InvalidPredicate",
            SpecificationError::OperatorNotApplicable { .. } => "OperatorNotApplicable",
            SpecificationError::EmptyCombinator { .. } => "EmptyCombinator",
            SpecificationError::UnsupportedOperator { .. } => "UnsupportedOperator",
        }
    }

    fn additional_info(&self) -> Map<String, JsonValue> {
        let info = match self {
            SpecificationError::InvalidPredicate {
                field,
                operator,
                expected,
                found,
            } => json!({
                "field": field,
                "operator": operator.as_str(),
                "expected": expected,
                "found": found,
            }),
            SpecificationError::OperatorNotApplicable {
                field,
                operator,
                field_type,
            } => json!({
                "field": field,
                "operator": operator.as_str(),
                "field_type": field_type.as_str(),
            }),
            SpecificationError::EmptyCombinator { combinator } => {
                json!({ "combinator": combinator })
            }
            SpecificationError::UnsupportedOperator { backend, operator } => json!({
                "backend": backend,
                "operator": operator.as_str(),
            }),
        };
        match info {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Failures raised by [`Repository`](crate::store::Repository) implementations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    /// `fields` names the filtered columns only; operand values stay out of
    /// the message since it may reach callers.
    #[error("no {entity} matches the filter on {}", .fields.join(", "))]
    NotFound {
        entity: &'static str,
        fields: Vec<&'static str>,
    },

    #[error("{entity} {id} already exists")]
    Conflict { entity: &'static str, id: String },

    #[error("Store error: {0}")]
    Storage(String),

    #[error(transparent)]
    Query(#[from] SpecificationError),
}

impl ErrorDomain for RepositoryError {
    const TAG: DomainTag = DomainTag::new("repository");
    const KINDS: &'static [ErrorKind] = &[
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::Unexpected,
        ErrorKind::InvalidSpecification,
        ErrorKind::UnsupportedOperator,
    ];
}

impl DomainError for RepositoryError {
    fn kind(&self) -> ErrorKind {
        match self {
            RepositoryError::NotFound { .. } => ErrorKind::NotFound,
            RepositoryError::Conflict { .. } => ErrorKind::Conflict,
            RepositoryError::Storage(_) => ErrorKind::Unexpected,
            RepositoryError::Query(inner) => inner.kind(),
        }
    }

    fn code(&self) -> &'static str {
        match self {
            RepositoryError::NotFound { .. } => "EntityNotFound",
            RepositoryError::Conflict { .. } => "DuplicateEntity",
            RepositoryError::Storage(_) => "StorageFailure",
            RepositoryError::Query(inner) => inner.code(),
        }
    }

    // Query failures keep the domain that raised them.
    fn domain(&self) -> DomainTag {
        match self {
            RepositoryError::Query(inner) => inner.domain(),
            _ => Self::TAG,
        }
    }

    fn additional_info(&self) -> Map<String, JsonValue> {
        let mut info = Map::new();
        match self {
            RepositoryError::NotFound { entity, fields } => {
                info.insert("entity".into(), json!(entity));
                info.insert("fields".into(), json!(fields));
            }
            RepositoryError::Conflict { entity, id } => {
                info.insert("entity".into(), json!(entity));
                info.insert("id".into(), json!(id));
            }
            RepositoryError::Storage(_) => {}
            RepositoryError::Query(inner) => return inner.additional_info(),
        }
        info
    }
}

/// Startup-time misconfiguration of the error handler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistrationError {
    #[error("a response mapper is already registered for {0}")]
    DuplicateMapping(MapperKey),

    #[error("kind {0} always uses the generic fallback and cannot be mapped")]
    ReservedKind(ErrorKind),

    #[error("the global error handler is already installed")]
    AlreadyInstalled,
}

pub type SpecResult<T> = std::result::Result<T, SpecificationError>;
pub type RepoResult<T> = std::result::Result<T, RepositoryError>;
