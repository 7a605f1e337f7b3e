//! # Exception Taxonomy
//!
//! Errors are organized per bounded domain. Each domain owns one `thiserror`
//! enum (its closed set of errors) that implements [`ErrorDomain`] and
//! [`DomainError`]:
//!
//! | Piece | Role |
//! |-------|------|
//! | [`ErrorKind`] | Closed category used for response mapping |
//! | [`DomainTag`] | Name of the domain that raised the error |
//! | [`ErrorDomain`] | Per-enum tag plus the kinds the domain may raise |
//! | [`DomainError`] | Per-variant kind, code and public details |
//! | [`Exception`] | Uniform value every domain error converts into |
//!
//! Failures travel as `Err(..)`. Nothing in the crate signals faults through
//! sentinel return values.

mod domain;
mod exception;
mod kind;

pub use domain::{DomainError, DomainTag, ErrorDomain, ExceptionType};
pub use exception::{Exception, UNCLASSIFIED};
pub use kind::ErrorKind;
