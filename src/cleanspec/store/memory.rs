use super::{Entity, Repository, Row};
use crate::error::{RepoResult, RepositoryError};
use crate::query::row::RowTranslator;
use crate::query::QueryTranslator;
use crate::spec::Specification;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{PoisonError, RwLock};
use tracing::{debug, trace};

struct Record<E> {
    row: Row,
    entity: E,
}

/// In-memory repository.
///
/// Keeps each entity next to its row and answers reads by running the
/// compiled [`RowFilter`](crate::query::row::RowFilter) over the rows, the
/// way a database would run a translated `WHERE` clause. Records are kept in
/// id order, so `find` results are deterministic.
pub struct InMemoryRepository<E: Entity> {
    records: RwLock<BTreeMap<E::Id, Record<E>>>,
    translator: RowTranslator,
    simulate_write_error: AtomicBool,
}

impl<E: Entity> Default for InMemoryRepository<E> {
    fn default() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            translator: RowTranslator,
            simulate_write_error: AtomicBool::new(false),
        }
    }
}

impl<E: Entity> InMemoryRepository<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated repository. Fails on duplicate ids.
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> RepoResult<Self> {
        let repo = Self::new();
        for entity in entities {
            repo.insert(entity)?;
        }
        Ok(repo)
    }

    /// Insert a new entity. Unlike `save`, an existing id is a conflict.
    pub fn insert(&self, entity: E) -> RepoResult<()> {
        self.check_writable()?;
        let id = entity.id();
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        if records.contains_key(&id) {
            return Err(RepositoryError::Conflict {
                entity: E::NAME,
                id: id.to_string(),
            });
        }
        trace!(entity = E::NAME, %id, "insert");
        records.insert(id, Self::record(entity));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    fn record(entity: E) -> Record<E> {
        Record {
            row: entity.to_row(),
            entity,
        }
    }

    fn check_writable(&self) -> RepoResult<()> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(RepositoryError::Storage("Simulated write error".to_string()));
        }
        Ok(())
    }

    fn select(&self, spec: &Specification<E>) -> RepoResult<Vec<E>> {
        let filter = self.translator.translate(spec)?;
        let records = self.records.read().unwrap_or_else(PoisonError::into_inner);
        let found: Vec<E> = records
            .values()
            .filter(|record| filter.matches(&record.row))
            .map(|record| record.entity.clone())
            .collect();
        debug!(entity = E::NAME, %spec, matched = found.len(), "find");
        Ok(found)
    }

    fn upsert(&self, entity: E) -> RepoResult<E> {
        self.check_writable()?;
        let id = entity.id();
        trace!(entity = E::NAME, %id, "save");
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        records.insert(id, Self::record(entity.clone()));
        Ok(entity)
    }

    fn remove(&self, entity: &E) -> RepoResult<()> {
        self.check_writable()?;
        let id = entity.id();
        let mut records = self.records.write().unwrap_or_else(PoisonError::into_inner);
        match records.remove(&id) {
            Some(_) => {
                trace!(entity = E::NAME, %id, "delete");
                Ok(())
            }
            None => {
                debug!(entity = E::NAME, %id, "delete of unknown id");
                Err(RepositoryError::NotFound {
                    entity: E::NAME,
                    fields: vec!["id"],
                })
            }
        }
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn find(&self, spec: &Specification<E>) -> RepoResult<Vec<E>> {
        self.select(spec)
    }

    /// First match in id order.
    async fn find_one(&self, spec: &Specification<E>) -> RepoResult<E> {
        self.select(spec)?.into_iter().next().ok_or_else(|| {
            debug!(entity = E::NAME, filter = %spec, "find_one matched nothing");
            RepositoryError::NotFound {
                entity: E::NAME,
                fields: spec.field_names(),
            }
        })
    }

    async fn save(&self, entity: E) -> RepoResult<E> {
        self.upsert(entity)
    }

    async fn delete(&self, entity: E) -> RepoResult<()> {
        self.remove(&entity)
    }
}
