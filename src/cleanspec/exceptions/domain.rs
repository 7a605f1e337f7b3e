use super::kind::ErrorKind;
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::collections::BTreeMap;
use std::fmt;

/// Name of a bounded domain (`"billing"`, `"repository"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct DomainTag(&'static str);

impl DomainTag {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for DomainTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// The root of a domain's error enum.
///
/// Declares the domain's tag and the complete set of kinds its errors may
/// carry. New errors are added as variants of the enum, never as ad-hoc
/// types at call sites.
pub trait ErrorDomain {
    const TAG: DomainTag;
    const KINDS: &'static [ErrorKind];
}

/// A concrete domain error.
///
/// Implemented by the domain's error enum; `kind` and `code` are usually an
/// exhaustive `match` over the variants.
///
/// ```ignore
/// #[derive(Debug, Error)]
/// pub enum BillingError {
///     #[error("invoice {0} not found")]
///     NoSuchInvoice(u64),
/// }
///
/// impl ErrorDomain for BillingError {
///     const TAG: DomainTag = DomainTag::new("billing");
///     const KINDS: &'static [ErrorKind] = &[ErrorKind::NotFound];
/// }
///
/// impl DomainError for BillingError {
///     fn kind(&self) -> ErrorKind {
///         match self {
///             BillingError::NoSuchInvoice(_) => ErrorKind::NotFound,
///         }
///     }
///     fn code(&self) -> &'static str {
///         match self {
///             BillingError::NoSuchInvoice(_) => "NoSuchInvoice",
///         }
///     }
/// }
/// ```
pub trait DomainError: ErrorDomain + std::error::Error + Send + Sync + 'static {
    fn kind(&self) -> ErrorKind;

    /// Stable name of the concrete error, exposed as `error_code`.
    fn code(&self) -> &'static str;

    fn domain(&self) -> DomainTag {
        Self::TAG
    }

    /// Machine-readable details safe to show to callers.
    fn additional_info(&self) -> Map<String, JsonValue> {
        Map::new()
    }

    /// Headers the transport should attach to the response.
    fn headers(&self) -> BTreeMap<String, String> {
        BTreeMap::new()
    }

    /// Whether the error handler should log this error at all.
    fn log_exception(&self) -> bool {
        true
    }
}

/// Identity of a concrete exception type: domain plus error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExceptionType {
    pub domain: DomainTag,
    pub code: &'static str,
}

impl ExceptionType {
    pub const fn new(domain: DomainTag, code: &'static str) -> Self {
        Self { domain, code }
    }

    pub fn of<D: ErrorDomain>(code: &'static str) -> Self {
        Self::new(D::TAG, code)
    }
}

impl fmt::Display for ExceptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.domain, self.code)
    }
}
