#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use cleanspec::exceptions::{DomainError, DomainTag, ErrorDomain, ErrorKind};
use cleanspec::store::Row;
use cleanspec::{Entity, Field, Specification, Value};
use serde_json::{json, Map, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: u32,
    pub name: String,
    pub age: Option<i64>,
    pub country: Option<String>,
    pub balance: Option<f64>,
    pub vip: bool,
    pub joined: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

pub const ID: Field<Customer> = Field::int("id", |c| Some(i64::from(c.id)));
pub const NAME: Field<Customer> = Field::text("name", |c| Some(c.name.as_str()));
pub const AGE: Field<Customer> = Field::int("age", |c| c.age);
pub const COUNTRY: Field<Customer> = Field::text("country", |c| c.country.as_deref());
pub const BALANCE: Field<Customer> = Field::float("balance", |c| c.balance);
pub const VIP: Field<Customer> = Field::bool("vip", |c| Some(c.vip));
pub const JOINED: Field<Customer> = Field::timestamp("joined", |c| c.joined);
pub const TAGS: Field<Customer> = Field::text_list("tags", |c| Some(c.tags.as_slice()));

impl Entity for Customer {
    type Id = u32;
    const NAME: &'static str = "customer";

    fn id(&self) -> u32 {
        self.id
    }

    fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("id", Value::Int(i64::from(self.id)));
        row.insert("name", Value::Str(self.name.clone()));
        row.insert("vip", Value::Bool(self.vip));
        row.insert(
            "tags",
            Value::List(self.tags.iter().cloned().map(Value::Str).collect()),
        );
        if let Some(age) = self.age {
            row.insert("age", Value::Int(age));
        }
        if let Some(country) = &self.country {
            row.insert("country", Value::Str(country.clone()));
        }
        if let Some(balance) = self.balance {
            row.insert("balance", Value::Float(balance));
        }
        if let Some(joined) = self.joined {
            row.insert("joined", Value::Timestamp(joined));
        }
        row
    }
}

pub fn customer(id: u32, name: &str, age: Option<i64>, country: Option<&str>) -> Customer {
    Customer {
        id,
        name: name.to_string(),
        age,
        country: country.map(str::to_string),
        balance: None,
        vip: false,
        joined: None,
        tags: Vec::new(),
    }
}

pub fn day(year: i32, month: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, d, 0, 0, 0).unwrap()
}

/// Customers with every combination of present and absent attributes the
/// tests care about.
pub fn customers() -> Vec<Customer> {
    let mut all = vec![
        customer(1, "Alice Adams", Some(20), Some("US")),
        customer(2, "Bob Brown", Some(15), Some("US")),
        customer(3, "Carla Cruz", Some(22), Some("DE")),
        customer(4, "Dmitri", None, Some("CA")),
        customer(5, "eli", Some(18), None),
        customer(6, "Farah 50%", Some(40), Some("CA")),
        customer(7, "Gus_", None, None),
        customer(8, "Hana", Some(67), Some("JP")),
    ];
    all[0].balance = Some(120.5);
    all[0].vip = true;
    all[0].joined = Some(day(2021, 3, 1));
    all[0].tags = vec!["vip".into(), "beta".into()];
    all[1].balance = Some(0.0);
    all[1].joined = Some(day(2023, 7, 14));
    all[2].balance = Some(100.0);
    all[2].tags = vec!["Beta".into()];
    all[3].vip = true;
    all[4].tags = vec!["vips".into()];
    all[5].balance = Some(-3.25);
    all[5].joined = Some(day(2019, 1, 1));
    all[7].tags = vec!["vip".into()];
    all
}

pub fn ids(customers: &[Customer]) -> Vec<u32> {
    customers.iter().map(|c| c.id).collect()
}

/// Ids of `customers()` that satisfy `spec`, evaluated in memory.
pub fn in_memory(spec: &Specification<Customer>) -> Vec<u32> {
    let matched: Vec<Customer> = customers()
        .into_iter()
        .filter(|c| spec.is_satisfied_by(c))
        .collect();
    ids(&matched)
}

/// Specifications every storage path must agree on.
pub fn specs() -> Vec<Specification<Customer>> {
    let none: [&str; 0] = [];
    vec![
        AGE.gte(18).unwrap().and(&COUNTRY.is_in(["US", "CA"]).unwrap()),
        AGE.gte(18).unwrap().not(),
        AGE.is_null().or(&COUNTRY.ne("DE").unwrap()),
        AGE.is_in([15.0, 67.0]).unwrap(),
        NAME.icontains("a").unwrap(),
        NAME.contains("%").unwrap(),
        NAME.contains("_").unwrap(),
        NAME.contains("").unwrap(),
        NAME.contains("a").unwrap().not(),
        TAGS.contains("vip").unwrap(),
        TAGS.contains("vi").unwrap(),
        TAGS.contains("vip").unwrap().not(),
        TAGS.icontains("beta").unwrap(),
        COUNTRY.not_in(["US"]).unwrap().not(),
        COUNTRY.is_in(none).unwrap(),
        COUNTRY.not_in(none).unwrap(),
        BALANCE.gt(100).unwrap(),
        BALANCE.lte(0.0).unwrap(),
        JOINED.lt(day(2022, 1, 1)).unwrap(),
        JOINED.gte(day(2021, 3, 1)).unwrap().not(),
        VIP.eq(true).unwrap().and(&AGE.is_not_null()),
        VIP.ne(true).unwrap(),
        Specification::all([
            AGE.gt(16).unwrap(),
            AGE.lt(50).unwrap(),
            COUNTRY.ne("JP").unwrap(),
        ])
        .unwrap(),
        Specification::any([
            COUNTRY.eq("JP").unwrap(),
            VIP.eq(true).unwrap(),
            NAME.eq("eli").unwrap(),
        ])
        .unwrap(),
        AGE.ne(20).unwrap().not().not(),
        ID.gte(4).unwrap().and(&ID.lte(6).unwrap()),
        BALANCE.is_null().not().and(&JOINED.is_null()),
    ]
}

#[derive(Error, Debug)]
pub enum BillingError {
    #[error("invoice {0} not found")]
    NoSuchInvoice(u32),

    #[error("invoice {0} is already paid")]
    AlreadyPaid(u32),

    #[error("amount must be positive, got {0}")]
    InvalidAmount(i64),

    #[error("customer {0} may not see this invoice")]
    NotOwner(u32),
}

impl ErrorDomain for BillingError {
    const TAG: DomainTag = DomainTag::new("billing");
    const KINDS: &'static [ErrorKind] = &[
        ErrorKind::NotFound,
        ErrorKind::Conflict,
        ErrorKind::ValidationFailed,
        ErrorKind::Forbidden,
    ];
}

impl DomainError for BillingError {
    fn kind(&self) -> ErrorKind {
        match self {
            BillingError::NoSuchInvoice(_) => ErrorKind::NotFound,
            BillingError::AlreadyPaid(_) => ErrorKind::Conflict,
            BillingError::InvalidAmount(_) => ErrorKind::ValidationFailed,
            BillingError::NotOwner(_) => ErrorKind::Forbidden,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            BillingError::NoSuchInvoice(_) => "NoSuchInvoice",
            BillingError::AlreadyPaid(_) => "AlreadyPaid",
            BillingError::InvalidAmount(_) => "InvalidAmount",
            BillingError::NotOwner(_) => "NotOwner",
        }
    }

    fn additional_info(&self) -> Map<String, JsonValue> {
        let mut info = Map::new();
        match self {
            BillingError::NoSuchInvoice(id) | BillingError::AlreadyPaid(id) => {
                info.insert("invoice_id".into(), json!(id));
            }
            BillingError::InvalidAmount(amount) => {
                info.insert("amount".into(), json!(amount));
            }
            BillingError::NotOwner(_) => {}
        }
        info
    }

    fn headers(&self) -> BTreeMap<String, String> {
        let mut headers = BTreeMap::new();
        if let BillingError::AlreadyPaid(id) = self {
            headers.insert("Location".into(), format!("/invoices/{}/receipt", id));
        }
        headers
    }
}
