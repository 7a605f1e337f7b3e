//! # Query Translation
//!
//! A [`QueryTranslator`] turns a [`Specification`] into something a storage
//! engine can execute. The specification drives the walk (see
//! [`Specification::to_query_fragment`]) and the translator only answers four
//! questions: how to express one condition, a conjunction, a disjunction and
//! a negation.
//!
//! ## Implementations
//!
//! - [`row::RowTranslator`]: compiles to a [`row::RowFilter`] that runs over
//!   column/value rows. Backs [`crate::store::memory::InMemoryRepository`].
//! - [`sql::SqlTranslator`]: renders a parameterized SQL `WHERE` fragment for
//!   Postgres or SQLite.
//!
//! A translator that cannot express an operator must fail with
//! [`SpecificationError::UnsupportedOperator`] rather than emit a looser
//! filter.
//!
//! [`SpecificationError::UnsupportedOperator`]: crate::error::SpecificationError::UnsupportedOperator

use crate::error::SpecResult;
use crate::spec::{FieldType, Operator, Predicate, Specification, Value};

pub mod row;
pub mod sql;

/// Storage-facing view of one predicate.
///
/// `field_type` is the column's declared type; translators use it where the
/// native expression differs by column type (substring vs list membership).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Condition<'a> {
    pub column: &'static str,
    pub field_type: FieldType,
    pub operator: Operator,
    pub value: &'a Value,
}

impl<'a, E> From<&'a Predicate<E>> for Condition<'a> {
    fn from(predicate: &'a Predicate<E>) -> Self {
        Self {
            column: predicate.field().name(),
            field_type: predicate.field().field_type(),
            operator: predicate.operator(),
            value: predicate.value(),
        }
    }
}

/// Backend-specific builder of native filters.
pub trait QueryTranslator {
    type Filter;

    /// Backend name, reported in unsupported-operator errors.
    fn backend(&self) -> &'static str;

    fn condition(&self, condition: Condition<'_>) -> SpecResult<Self::Filter>;

    /// Conjunction; `parts` is never empty.
    fn all(&self, parts: Vec<Self::Filter>) -> SpecResult<Self::Filter>;

    /// Disjunction; `parts` is never empty.
    fn any(&self, parts: Vec<Self::Filter>) -> SpecResult<Self::Filter>;

    fn negate(&self, part: Self::Filter) -> SpecResult<Self::Filter>;

    fn translate<E>(&self, spec: &Specification<E>) -> SpecResult<Self::Filter>
    where
        Self: Sized,
    {
        spec.to_query_fragment(self)
    }
}
