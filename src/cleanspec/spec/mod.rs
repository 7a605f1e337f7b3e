//! # Specifications
//!
//! Storage-independent filters over entities. Instead of handing repositories
//! raw field/value pairs, callers compose typed predicates:
//!
//! - **Fields** ([`Field`]): typed accessors bound to one entity type, each
//!   declaring a [`FieldType`]
//! - **Predicates** ([`Predicate`]): one field, one [`Operator`], one [`Value`]
//! - **Trees** ([`Specification`]): predicates joined with AND/OR/NOT
//! - **Ordering** ([`OrderBy`]): sort keys for repository results
//!
//! ## Usage
//!
//! ```ignore
//! let spec = AGE.gte(18)?.and(&COUNTRY.is_in(["US", "CA"])?);
//!
//! // In memory
//! let adults: Vec<_> = people.iter().filter(|p| spec.is_satisfied_by(p)).collect();
//!
//! // Against storage
//! let filter = spec.to_query_fragment(&SqlTranslator::new(SqlDialect::Postgres))?;
//! ```
//!
//! Both paths must select the same entities; the query translators are tested
//! against in-memory evaluation for exactly that reason.

mod field;
mod order;
mod predicate;
mod tree;
mod value;

pub use field::{Field, FieldType};
pub use order::{sort_by_order, Direction, OrderBy};
pub use predicate::{Operator, Predicate};
pub use tree::{Node, Specification};
pub use value::Value;
