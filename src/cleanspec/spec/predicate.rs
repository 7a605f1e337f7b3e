//! Atomic predicates.
//!
//! A [`Predicate`] is the leaf of a specification tree: one field, one
//! operator, one operand. Operands are validated at construction against both
//! the operator and the field's declared type, so a predicate that exists can
//! always be evaluated and translated.

use super::field::{Field, FieldType};
use super::value::Value;
use crate::error::{SpecResult, SpecificationError};
use std::cmp::Ordering;
use std::fmt;

/// Comparison operator of a predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    /// Field value equals one of the listed values.
    In,
    /// Field is present and equals none of the listed values.
    NotIn,
    /// Substring match on strings, item match on lists.
    Contains,
    /// Case-insensitive [`Operator::Contains`].
    IContains,
    /// `Bool(true)` matches absence, `Bool(false)` matches presence.
    IsNull,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::In => "IN",
            Operator::NotIn => "NOT IN",
            Operator::Contains => "CONTAINS",
            Operator::IContains => "ICONTAINS",
            Operator::IsNull => "IS NULL",
        }
    }

    /// Apply the operator to a (possibly absent) field value.
    ///
    /// Total: absent fields only ever satisfy `IsNull(true)`, mismatched
    /// shapes never match.
    pub fn test(self, actual: Option<&Value>, operand: &Value) -> bool {
        let actual = match (self, actual) {
            (Operator::IsNull, actual) => {
                return actual.is_none() == operand.as_bool().unwrap_or(true)
            }
            (_, None) => return false,
            (_, Some(actual)) => actual,
        };

        match self {
            Operator::Eq => actual.matches(operand),
            Operator::Ne => actual
                .compare(operand)
                .is_some_and(|ord| ord != Ordering::Equal),
            Operator::Lt => actual.compare(operand) == Some(Ordering::Less),
            Operator::Lte => matches!(
                actual.compare(operand),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Operator::Gt => actual.compare(operand) == Some(Ordering::Greater),
            Operator::Gte => matches!(
                actual.compare(operand),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Operator::In => operand
                .as_list()
                .is_some_and(|items| items.iter().any(|item| actual.matches(item))),
            Operator::NotIn => operand
                .as_list()
                .is_some_and(|items| !items.iter().any(|item| actual.matches(item))),
            Operator::Contains => operand
                .as_str()
                .is_some_and(|needle| actual.contains_str(needle, false)),
            Operator::IContains => operand
                .as_str()
                .is_some_and(|needle| actual.contains_str(needle, true)),
            Operator::IsNull => false,
        }
    }

    /// Check that `value` has a shape this operator accepts.
    fn validate(self, field: &'static str, value: &Value) -> SpecResult<()> {
        let expected = match self {
            Operator::Eq | Operator::Ne if value.is_scalar() && !value.is_nan() => {
                return Ok(())
            }
            Operator::Eq | Operator::Ne => "a scalar",
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte
                if value.is_orderable() =>
            {
                return Ok(())
            }
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
                "an orderable scalar"
            }
            Operator::In | Operator::NotIn => match value.as_list() {
                Some(items) => {
                    if let Some(bad) = items
                        .iter()
                        .find(|item| !item.is_scalar() || item.is_nan())
                    {
                        return Err(SpecificationError::InvalidPredicate {
                            field,
                            operator: self,
                            expected: "a list of scalars",
                            found: bad.shape(),
                        });
                    }
                    return Ok(())
                }
                None => "a list",
            },
            Operator::Contains | Operator::IContains if value.as_str().is_some() => {
                return Ok(())
            }
            Operator::Contains | Operator::IContains => "a string",
            Operator::IsNull if value.as_bool().is_some() => return Ok(()),
            Operator::IsNull => "a bool",
        };

        Err(SpecificationError::InvalidPredicate {
            field,
            operator: self,
            expected,
            found: value.shape(),
        })
    }

    /// Check the operator and operand against the field's declared type.
    /// Runs after [`Operator::validate`], so the operand shape is known good.
    fn check_field(
        self,
        field: &'static str,
        field_type: FieldType,
        value: &Value,
    ) -> SpecResult<()> {
        let applies = match self {
            Operator::Contains | Operator::IContains => {
                matches!(field_type, FieldType::Text | FieldType::TextList)
            }
            Operator::IsNull => true,
            _ => field_type != FieldType::TextList,
        };
        if !applies {
            return Err(SpecificationError::OperatorNotApplicable {
                field,
                operator: self,
                field_type,
            });
        }

        let operands = match (self, value.as_list()) {
            (Operator::In | Operator::NotIn, Some(items)) => items,
            (Operator::Contains | Operator::IContains | Operator::IsNull, _) => return Ok(()),
            _ => std::slice::from_ref(value),
        };
        match operands.iter().find(|item| !field_type.accepts(item)) {
            Some(bad) => Err(SpecificationError::InvalidPredicate {
                field,
                operator: self,
                expected: field_type.operand(),
                found: bad.shape(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single condition on a field of `E`.
pub struct Predicate<E> {
    field: Field<E>,
    operator: Operator,
    value: Value,
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self {
            field: self.field,
            operator: self.operator,
            value: self.value.clone(),
        }
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate")
            .field("field", &self.field.name())
            .field("operator", &self.operator)
            .field("value", &self.value)
            .finish()
    }
}

impl<E> Predicate<E> {
    /// Build a predicate.
    ///
    /// Fails with [`SpecificationError::InvalidPredicate`] when `value` does
    /// not fit `operator` (e.g. `In` with a scalar) or the field's type
    /// (`age = "20"`), and with [`SpecificationError::OperatorNotApplicable`]
    /// when the operator makes no sense for the field (`CONTAINS` on a number).
    pub fn new(field: Field<E>, operator: Operator, value: Value) -> SpecResult<Self> {
        operator.validate(field.name(), &value)?;
        operator.check_field(field.name(), field.field_type(), &value)?;
        Ok(Self {
            field,
            operator,
            value,
        })
    }

    pub(crate) fn null_check(field: Field<E>, is_null: bool) -> Self {
        Self {
            field,
            operator: Operator::IsNull,
            value: Value::Bool(is_null),
        }
    }

    pub fn field(&self) -> &Field<E> {
        &self.field
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn evaluate(&self, entity: &E) -> bool {
        let actual = self.field.get(entity);
        self.operator.test(actual.as_ref(), &self.value)
    }
}

impl<E> fmt::Display for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.operator, &self.value) {
            (Operator::IsNull, Value::Bool(false)) => {
                write!(f, "{} IS NOT NULL", self.field.name())
            }
            (Operator::IsNull, _) => write!(f, "{} IS NULL", self.field.name()),
            (op, value) => write!(f, "{} {} {}", self.field.name(), op, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{person, Person, AGE, COUNTRY, NAME, TAGS};

    fn pred(field: Field<Person>, op: Operator, value: impl Into<Value>) -> Predicate<Person> {
        Predicate::new(field, op, value.into()).unwrap()
    }

    #[test]
    fn comparison_operators() {
        let p = person(1, "Ada", Some(20), None);
        assert!(pred(AGE, Operator::Eq, 20).evaluate(&p));
        assert!(pred(AGE, Operator::Ne, 21).evaluate(&p));
        assert!(pred(AGE, Operator::Lt, 21).evaluate(&p));
        assert!(pred(AGE, Operator::Lte, 20).evaluate(&p));
        assert!(!pred(AGE, Operator::Gt, 20).evaluate(&p));
        assert!(pred(AGE, Operator::Gte, 19.5).evaluate(&p));
    }

    #[test]
    fn absent_field_fails_every_operator_but_is_null() {
        let p = person(1, "Ada", None, None);
        assert!(!pred(AGE, Operator::Eq, 20).evaluate(&p));
        assert!(!pred(AGE, Operator::Ne, 20).evaluate(&p));
        assert!(!pred(AGE, Operator::Lt, 20).evaluate(&p));
        assert!(!pred(COUNTRY, Operator::NotIn, vec!["US"]).evaluate(&p));
        assert!(!pred(COUNTRY, Operator::Contains, "U").evaluate(&p));
        assert!(Predicate::null_check(AGE, true).evaluate(&p));
        assert!(!Predicate::null_check(AGE, false).evaluate(&p));
    }

    #[test]
    fn membership() {
        let p = person(1, "Ada", None, Some("CA"));
        assert!(pred(COUNTRY, Operator::In, vec!["US", "CA"]).evaluate(&p));
        assert!(!pred(COUNTRY, Operator::NotIn, vec!["US", "CA"]).evaluate(&p));
        assert!(!pred(COUNTRY, Operator::In, Vec::<String>::new()).evaluate(&p));
        assert!(pred(COUNTRY, Operator::NotIn, Vec::<String>::new()).evaluate(&p));
    }

    #[test]
    fn contains_on_strings_and_lists() {
        let mut p = person(1, "Grace Hopper", None, None);
        p.tags = vec!["navy".into(), "cobol".into()];
        assert!(pred(NAME, Operator::Contains, "Hop").evaluate(&p));
        assert!(!pred(NAME, Operator::Contains, "hop").evaluate(&p));
        assert!(pred(NAME, Operator::IContains, "hop").evaluate(&p));
        assert!(pred(TAGS, Operator::Contains, "cobol").evaluate(&p));
        assert!(pred(TAGS, Operator::IContains, "NAVY").evaluate(&p));
    }

    #[test]
    fn operand_must_match_field_type() {
        let err = AGE.eq("20").unwrap_err();
        assert_eq!(
            err,
            SpecificationError::InvalidPredicate {
                field: "age",
                operator: Operator::Eq,
                expected: "a number",
                found: "string",
            }
        );
        assert!(AGE.ne("20").is_err());
        assert!(COUNTRY.gt(5).is_err());
        assert!(AGE.is_in([Value::Int(1), Value::from("2")]).is_err());
        assert!(COUNTRY.not_in([1, 2]).is_err());
    }

    #[test]
    fn contains_needs_text_or_list_field() {
        let err = AGE.contains("2").unwrap_err();
        assert_eq!(
            err,
            SpecificationError::OperatorNotApplicable {
                field: "age",
                operator: Operator::Contains,
                field_type: FieldType::Int,
            }
        );
        assert!(AGE.icontains("2").is_err());
        assert!(NAME.contains("2").is_ok());
        assert!(TAGS.icontains("x").is_ok());
    }

    #[test]
    fn list_fields_only_take_membership_and_null_checks() {
        assert!(matches!(
            TAGS.eq("vip").unwrap_err(),
            SpecificationError::OperatorNotApplicable { .. }
        ));
        assert!(TAGS.is_in(["vip"]).is_err());
        assert!(!TAGS.is_null().is_satisfied_by(&person(1, "a", None, None)));
    }

    #[test]
    fn numeric_fields_mix_ints_and_floats() {
        let p = person(1, "Ada", Some(20), None);
        assert!(pred(AGE, Operator::Lt, 20.5).evaluate(&p));
        assert!(pred(AGE, Operator::In, vec![19.0, 20.0]).evaluate(&p));
    }

    #[test]
    fn in_with_scalar_is_rejected() {
        let err = Predicate::new(COUNTRY, Operator::In, Value::from("US")).unwrap_err();
        assert_eq!(
            err,
            SpecificationError::InvalidPredicate {
                field: "country",
                operator: Operator::In,
                expected: "a list",
                found: "string",
            }
        );
    }

    #[test]
    fn invalid_shapes_are_rejected() {
        assert!(Predicate::new(AGE, Operator::Eq, Value::from(vec![1])).is_err());
        assert!(Predicate::new(AGE, Operator::Gt, Value::Bool(true)).is_err());
        assert!(Predicate::new(AGE, Operator::Gt, Value::Float(f64::NAN)).is_err());
        assert!(Predicate::new(NAME, Operator::Contains, Value::Int(1)).is_err());
        assert!(Predicate::new(AGE, Operator::IsNull, Value::Int(1)).is_err());
        let nested = Value::List(vec![Value::from(vec![1])]);
        assert!(Predicate::new(AGE, Operator::In, nested).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(pred(AGE, Operator::Gte, 18).to_string(), "age >= 18");
        assert_eq!(
            pred(COUNTRY, Operator::In, vec!["US", "CA"]).to_string(),
            r#"country IN ["US", "CA"]"#
        );
        assert_eq!(Predicate::null_check(AGE, false).to_string(), "age IS NOT NULL");
    }
}
