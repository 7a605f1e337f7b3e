use crate::exceptions::{DomainError, DomainTag, ErrorDomain, ErrorKind};
use crate::spec::{Field, Value};
use crate::store::{Entity, Row};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub age: Option<i64>,
    pub country: Option<String>,
    pub tags: Vec<String>,
}

pub const ID: Field<Person> = Field::int("id", |p| Some(i64::from(p.id)));
pub const NAME: Field<Person> = Field::text("name", |p| Some(p.name.as_str()));
pub const AGE: Field<Person> = Field::int("age", |p| p.age);
pub const COUNTRY: Field<Person> = Field::text("country", |p| p.country.as_deref());
pub const TAGS: Field<Person> = Field::text_list("tags", |p| Some(p.tags.as_slice()));

impl Entity for Person {
    type Id = u32;
    const NAME: &'static str = "person";

    fn id(&self) -> u32 {
        self.id
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id", Value::Int(i64::from(self.id)));
        row.insert("name", Value::Str(self.name.clone()));
        if let Some(age) = self.age {
            row.insert("age", Value::Int(age));
        }
        if let Some(country) = &self.country {
            row.insert("country", Value::Str(country.clone()));
        }
        row.insert(
            "tags",
            Value::List(self.tags.iter().cloned().map(Value::Str).collect()),
        );
        row
    }
}

pub fn person(id: u32, name: &str, age: Option<i64>, country: Option<&str>) -> Person {
    Person {
        id,
        name: name.to_string(),
        age,
        country: country.map(str::to_string),
        tags: Vec::new(),
    }
}

/// Mix of present and absent attributes.
pub fn sample_people() -> Vec<Person> {
    let mut people = vec![
        person(1, "Alice", Some(20), Some("US")),
        person(2, "Bob", Some(15), Some("US")),
        person(3, "Carla", Some(22), Some("DE")),
        person(4, "Dmitri", None, Some("CA")),
        person(5, "Eli", Some(18), None),
        person(6, "Farah", Some(40), Some("CA")),
        person(7, "Gus", None, None),
    ];
    people[0].tags = vec!["admin".into(), "rust".into()];
    people[5].tags = vec!["Rust".into()];
    people
}

#[derive(Error, Debug)]
pub enum ExampleError {
    #[error("example {0} not found")]
    NoSuchExample(u32),

    #[error("business rule violated: {0}")]
    BusinessRule(String),

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

impl ErrorDomain for ExampleError {
    const TAG: DomainTag = DomainTag::new("example");
    const KINDS: &'static [ErrorKind] = &[
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::ValidationFailed,
    ];
}

impl DomainError for ExampleError {
    fn kind(&self) -> ErrorKind {
        match self {
            ExampleError::NoSuchExample(_) => ErrorKind::NotFound,
            ExampleError::BusinessRule(_) => ErrorKind::Conflict,
            ExampleError::InvalidEmail(_) => ErrorKind::ValidationFailed,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ExampleError::NoSuchExample(_) => "NoSuchExample",
            ExampleError::BusinessRule(_) => "BusinessRule",
            ExampleError::InvalidEmail(_) => "InvalidEmail",
        }
    }

    fn additional_info(&self) -> Map<String, JsonValue> {
        let mut info = Map::new();
        if let ExampleError::NoSuchExample(id) = self {
            info.insert("example_id".into(), json!(id));
        }
        info
    }

    fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let ExampleError::BusinessRule(_) = self {
            headers.insert("Retry-After".into(), "30".into());
        }
        headers
    }

    fn log_exception(&self) -> bool {
        !matches!(self, ExampleError::InvalidEmail(_))
    }
}
