//! # Cleanspec Architecture
//!
//! Cleanspec is the **domain core** of a layered service: composable
//! specifications for querying entities, a repository contract, and a closed
//! error taxonomy with a single fault-to-response boundary. It has no network,
//! file or CLI surface of its own; transports and storage engines live around
//! it.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Transport (not in this crate)                              │
//! │  - Calls ErrorHandler::handle at its top-level boundary     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Error Handler (handler/)                                   │
//! │  - Exception → ErrorResponse, type → kind → fallback        │
//! │  - The ONLY place that renders caller-facing error text     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Repository (store/)                                        │
//! │  - Async Repository trait, reads filtered by Specification  │
//! │  - InMemoryRepository (reference, testing)                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Query Translation (query/)                                 │
//! │  - RowTranslator (in-memory rows), SqlTranslator (SQL)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Specifications (spec/)                                     │
//! │  - Typed fields, predicates, AND/OR/NOT trees, ordering     │
//! │  - Pure, synchronous, immutable                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: Evaluation and Translation Agree
//!
//! For any set of entities `S` and specification `spec`, filtering `S` with
//! [`Specification::is_satisfied_by`] and running the translated query over a
//! store holding exactly `S` select the same entities. Absent attributes
//! follow one two-valued policy everywhere: only `is_null` matches them.
//!
//! ## Errors
//!
//! Each domain owns a `thiserror` enum implementing
//! [`DomainError`](exceptions::DomainError); `?` converts it into the
//! uniform [`Exception`]. Construction faults surface at the call site
//! (builders return `Result`), never at evaluation time.
//!
//! ## Module Overview
//!
//! - [`spec`]: Fields, predicates, specification trees and ordering
//! - [`query`]: The `QueryTranslator` seam and its row/SQL implementations
//! - [`store`]: `Entity`, the `Repository` trait and the in-memory repository
//! - [`exceptions`]: `ErrorKind`, domain tags and the `Exception` value
//! - [`handler`]: Exception-to-response mapping and process-wide installation
//! - [`config`]: Handler configuration
//! - [`error`]: Error enums for this crate's own domains

pub mod config;
pub mod error;
pub mod exceptions;
pub mod handler;
pub mod query;
pub mod spec;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use config::HandlerConfig;
pub use error::{RegistrationError, RepoResult, RepositoryError, SpecResult, SpecificationError};
pub use exceptions::{DomainError, DomainTag, ErrorDomain, ErrorKind, Exception, ExceptionType};
pub use handler::{ErrorBody, ErrorHandler, ErrorResponse, MapperKey, Resolution};
pub use query::QueryTranslator;
pub use spec::{Direction, Field, FieldType, Operator, OrderBy, Predicate, Specification, Value};
pub use store::{Entity, Repository};
