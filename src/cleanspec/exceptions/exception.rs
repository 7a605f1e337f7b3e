use super::domain::{DomainError, DomainTag, ExceptionType};
use super::kind::ErrorKind;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::error;

/// Domain tag of faults that were never classified by a domain.
pub const UNCLASSIFIED: DomainTag = DomainTag::new("unclassified");

/// Uniform, domain-tagged error value.
///
/// Domain enums convert into an `Exception` with `?` (via `From`), so every
/// layer above the domain deals with one type. Exceptions are never mutated
/// after construction; [`Exception::context`] builds a new outer frame.
#[derive(Debug, Clone, Error)]
#[error("{domain}::{code} ({kind}): {message}")]
pub struct Exception {
    kind: ErrorKind,
    declared_kind: ErrorKind,
    domain: DomainTag,
    code: &'static str,
    message: String,
    additional_info: Map<String, JsonValue>,
    headers: BTreeMap<String, String>,
    log: bool,
    #[source]
    cause: Option<Box<Exception>>,
}

impl<D: DomainError> From<D> for Exception {
    fn from(err: D) -> Self {
        let kind = err.kind();
        if !D::KINDS.contains(&kind) {
            error!(
                domain = %err.domain(),
                code = err.code(),
                %kind,
                "domain raised a kind it does not declare"
            );
        }
        Self {
            kind,
            declared_kind: kind,
            domain: err.domain(),
            code: err.code(),
            message: err.to_string(),
            additional_info: err.additional_info(),
            headers: err.headers(),
            log: err.log_exception(),
            cause: None,
        }
    }
}

impl Exception {
    /// Classify a foreign error as [`ErrorKind::Unexpected`].
    ///
    /// The full source chain is kept in the message for logging; the error
    /// handler never shows it to callers.
    pub fn unexpected<E>(error: E) -> Self
    where
        E: std::error::Error + 'static,
    {
        let root: &(dyn std::error::Error + 'static) = &error;
        let message = std::iter::successors(Some(root), |e| e.source())
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(": ");
        Self {
            kind: ErrorKind::Unexpected,
            declared_kind: ErrorKind::Unexpected,
            domain: UNCLASSIFIED,
            code: "Unexpected",
            message,
            additional_info: Map::new(),
            headers: BTreeMap::new(),
            log: true,
            cause: None,
        }
    }

    /// Wrap `self` in an outer domain frame.
    ///
    /// The outer error supplies domain, code, message, info and log flag.
    /// Headers are merged, the outer frame winning on conflicts. The kind of
    /// `self` is preserved so the response category does not change; when it
    /// differs from the outer error's own kind, the frame no longer resolves
    /// through a mapper registered for the outer exception type (see
    /// [`Exception::declared_kind`]).
    pub fn context<D: DomainError>(self, outer: D) -> Self {
        let mut wrapped = Exception::from(outer);
        wrapped.kind = self.kind;
        let mut headers = self.headers.clone();
        headers.append(&mut wrapped.headers);
        wrapped.headers = headers;
        wrapped.cause = Some(Box::new(self));
        wrapped
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Kind the outermost domain error declared for itself. Equal to
    /// [`Exception::kind`] unless [`Exception::context`] carried a different
    /// kind up from a cause.
    pub fn declared_kind(&self) -> ErrorKind {
        self.declared_kind
    }

    pub fn domain(&self) -> DomainTag {
        self.domain
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn additional_info(&self) -> &Map<String, JsonValue> {
        &self.additional_info
    }

    /// Transport headers requested by the domain error (e.g. `Retry-After`).
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// False when the domain error opted out of handler logging.
    pub fn should_log(&self) -> bool {
        self.log
    }

    pub fn cause(&self) -> Option<&Exception> {
        self.cause.as_deref()
    }

    pub fn exception_type(&self) -> ExceptionType {
        ExceptionType::new(self.domain, self.code)
    }

    pub fn is_public(&self) -> bool {
        self.kind.is_public()
    }

    /// `self` followed by each wrapped cause, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Exception> {
        std::iter::successors(Some(self), |e| e.cause())
    }

    pub fn root_cause(&self) -> &Exception {
        self.chain().last().unwrap_or(self)
    }

    /// Single-line rendering of the whole chain, for logs.
    pub fn report(&self) -> String {
        self.chain()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" <- ")
    }
}
