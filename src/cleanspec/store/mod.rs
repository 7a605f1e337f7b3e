//! # Repositories
//!
//! The [`Repository`] trait is the storage-facing contract consumed by the
//! application layer. Reads take a [`Specification`]; writes take whole
//! entities. Specifications never drive writes.
//!
//! ## Equivalence
//!
//! A repository built on a [`QueryTranslator`](crate::query::QueryTranslator)
//! must return exactly the entities for which
//! [`Specification::is_satisfied_by`] holds. Implementations get this by
//! translating every operator faithfully and failing with
//! `UnsupportedOperator` where they cannot.
//!
//! ## Implementations
//!
//! - [`memory::InMemoryRepository`]: reference implementation over
//!   [`RowTranslator`](crate::query::row::RowTranslator). For tests and
//!   prototypes.

use crate::error::RepoResult;
use crate::spec::{sort_by_order, OrderBy, Specification};
use async_trait::async_trait;
use std::fmt::Display;

pub mod memory;

pub use crate::query::row::Row;

/// A storable entity.
///
/// `to_row` is the entity's storage representation: one value per column,
/// keyed by the same names its [`Field`](crate::spec::Field)s use. Absent
/// attributes are left out of the row.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Ord + Clone + Display + Send + Sync + 'static;

    /// Name used in errors and logs.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;

    fn to_row(&self) -> Row;
}

#[async_trait]
pub trait Repository<E: Entity>: Send + Sync {
    /// Every entity matching `spec`.
    async fn find(&self, spec: &Specification<E>) -> RepoResult<Vec<E>>;

    /// One matching entity, or `NotFound`.
    async fn find_one(&self, spec: &Specification<E>) -> RepoResult<E>;

    /// Insert or replace by id. Returns the stored entity.
    async fn save(&self, entity: E) -> RepoResult<E>;

    async fn delete(&self, entity: E) -> RepoResult<()>;

    /// [`find`](Repository::find) followed by a stable multi-key sort.
    async fn find_ordered(
        &self,
        spec: &Specification<E>,
        order: &[OrderBy<E>],
    ) -> RepoResult<Vec<E>> {
        let mut found = self.find(spec).await?;
        sort_by_order(&mut found, order);
        Ok(found)
    }
}
