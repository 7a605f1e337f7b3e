//! Typed field references.
//!
//! A [`Field`] names an attribute path on one entity type, declares the type of
//! value stored there and knows how to read it. Fields are declared once,
//! usually as constants next to the entity:
//!
//! ```ignore
//! pub const AGE: Field<Person> = Field::int("age", |p| p.age);
//! pub const COUNTRY: Field<Person> = Field::text("country", |p| p.country.as_deref());
//! let adults = AGE.gte(18)?;
//! ```
//!
//! The name doubles as the storage column used by query translators, so it
//! must match whatever the entity's row representation calls the attribute.
//! Dotted names (`owner.country`) denote nested paths.
//!
//! The declared [`FieldType`] is checked against every operand when a
//! predicate is built, and handed to query translators as the column's schema.

use super::order::{Direction, OrderBy};
use super::predicate::{Operator, Predicate};
use super::tree::Specification;
use super::value::Value;
use crate::error::SpecResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declared type of a field's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Text,
    Timestamp,
    Uuid,
    /// A list of strings (tags, labels). Only `contains`, `icontains` and
    /// null checks apply.
    TextList,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::Int => "integer",
            FieldType::Float => "float",
            FieldType::Text => "text",
            FieldType::Timestamp => "timestamp",
            FieldType::Uuid => "uuid",
            FieldType::TextList => "text list",
        }
    }

    /// Operand a comparison against this field needs, for error messages.
    pub fn operand(&self) -> &'static str {
        match self {
            FieldType::Bool => "a bool",
            FieldType::Int | FieldType::Float => "a number",
            FieldType::Text => "a string",
            FieldType::Timestamp => "a timestamp",
            FieldType::Uuid => "a uuid",
            FieldType::TextList => "no scalar",
        }
    }

    /// True if a scalar operand can be compared with values of this type.
    /// Integers and floats are interchangeable.
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::Bool, Value::Bool(_))
                | (FieldType::Int | FieldType::Float, Value::Int(_) | Value::Float(_))
                | (FieldType::Text, Value::Str(_))
                | (FieldType::Timestamp, Value::Timestamp(_))
                | (FieldType::Uuid, Value::Uuid(_))
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum Accessor<E> {
    Bool(fn(&E) -> Option<bool>),
    Int(fn(&E) -> Option<i64>),
    Float(fn(&E) -> Option<f64>),
    Text(fn(&E) -> Option<&str>),
    Timestamp(fn(&E) -> Option<DateTime<Utc>>),
    Uuid(fn(&E) -> Option<Uuid>),
    TextList(fn(&E) -> Option<&[String]>),
}

impl<E> Clone for Accessor<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Accessor<E> {}

/// Reference to an attribute of `E`.
pub struct Field<E> {
    name: &'static str,
    accessor: Accessor<E>,
}

impl<E> Clone for Field<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Field<E> {}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field")
            .field(&self.name)
            .field(&self.field_type())
            .finish()
    }
}

impl<E> Field<E> {
    pub const fn bool(name: &'static str, accessor: fn(&E) -> Option<bool>) -> Self {
        Self {
            name,
            accessor: Accessor::Bool(accessor),
        }
    }

    pub const fn int(name: &'static str, accessor: fn(&E) -> Option<i64>) -> Self {
        Self {
            name,
            accessor: Accessor::Int(accessor),
        }
    }

    pub const fn float(name: &'static str, accessor: fn(&E) -> Option<f64>) -> Self {
        Self {
            name,
            accessor: Accessor::Float(accessor),
        }
    }

    pub const fn text(name: &'static str, accessor: fn(&E) -> Option<&str>) -> Self {
        Self {
            name,
            accessor: Accessor::Text(accessor),
        }
    }

    pub const fn timestamp(
        name: &'static str,
        accessor: fn(&E) -> Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            name,
            accessor: Accessor::Timestamp(accessor),
        }
    }

    pub const fn uuid(name: &'static str, accessor: fn(&E) -> Option<Uuid>) -> Self {
        Self {
            name,
            accessor: Accessor::Uuid(accessor),
        }
    }

    pub const fn text_list(name: &'static str, accessor: fn(&E) -> Option<&[String]>) -> Self {
        Self {
            name,
            accessor: Accessor::TextList(accessor),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn field_type(&self) -> FieldType {
        match self.accessor {
            Accessor::Bool(_) => FieldType::Bool,
            Accessor::Int(_) => FieldType::Int,
            Accessor::Float(_) => FieldType::Float,
            Accessor::Text(_) => FieldType::Text,
            Accessor::Timestamp(_) => FieldType::Timestamp,
            Accessor::Uuid(_) => FieldType::Uuid,
            Accessor::TextList(_) => FieldType::TextList,
        }
    }

    /// Read the field from an entity. `None` means the attribute is absent.
    pub fn get(&self, entity: &E) -> Option<Value> {
        match self.accessor {
            Accessor::Bool(read) => read(entity).map(Value::Bool),
            Accessor::Int(read) => read(entity).map(Value::Int),
            Accessor::Float(read) => read(entity).map(Value::Float),
            Accessor::Text(read) => read(entity).map(Value::from),
            Accessor::Timestamp(read) => read(entity).map(Value::Timestamp),
            Accessor::Uuid(read) => read(entity).map(Value::Uuid),
            Accessor::TextList(read) => read(entity).map(|items| {
                Value::List(items.iter().map(|item| Value::from(item.as_str())).collect())
            }),
        }
    }

    fn predicate(self, operator: Operator, value: Value) -> SpecResult<Specification<E>> {
        Predicate::new(self, operator, value).map(Specification::from)
    }

    pub fn eq(self, value: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Eq, value.into())
    }

    pub fn ne(self, value: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Ne, value.into())
    }

    pub fn lt(self, value: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Lt, value.into())
    }

    pub fn lte(self, value: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Lte, value.into())
    }

    pub fn gt(self, value: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Gt, value.into())
    }

    pub fn gte(self, value: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Gte, value.into())
    }

    /// Membership. Accepts a list directly or any iterable of values.
    pub fn is_in<I, V>(self, values: I) -> SpecResult<Specification<E>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = values.into_iter().map(Into::into).collect();
        self.predicate(Operator::In, Value::List(items))
    }

    pub fn not_in<I, V>(self, values: I) -> SpecResult<Specification<E>>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = values.into_iter().map(Into::into).collect();
        self.predicate(Operator::NotIn, Value::List(items))
    }

    pub fn contains(self, needle: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::Contains, needle.into())
    }

    pub fn icontains(self, needle: impl Into<Value>) -> SpecResult<Specification<E>> {
        self.predicate(Operator::IContains, needle.into())
    }

    pub fn is_null(self) -> Specification<E> {
        Specification::from(Predicate::null_check(self, true))
    }

    pub fn is_not_null(self) -> Specification<E> {
        Specification::from(Predicate::null_check(self, false))
    }

    pub fn asc(self) -> OrderBy<E> {
        OrderBy::new(self, Direction::Asc)
    }

    pub fn desc(self) -> OrderBy<E> {
        OrderBy::new(self, Direction::Desc)
    }
}
