//! Result ordering.
//!
//! [`OrderBy`] keys are applied in sequence: the second key only breaks ties
//! left by the first. Absent values sort after present ones in both
//! directions, matching `NULLS LAST` in the SQL rendering.

use super::field::Field;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// One sort key.
pub struct OrderBy<E> {
    field: Field<E>,
    direction: Direction,
}

impl<E> Clone for OrderBy<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for OrderBy<E> {}

impl<E> fmt::Debug for OrderBy<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBy")
            .field("field", &self.field.name())
            .field("direction", &self.direction)
            .finish()
    }
}

impl<E> OrderBy<E> {
    pub fn new(field: Field<E>, direction: Direction) -> Self {
        Self { field, direction }
    }

    pub fn field(&self) -> &Field<E> {
        &self.field
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    fn compare(&self, a: &E, b: &E) -> Ordering {
        match (self.field.get(a), self.field.get(b)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = x.compare(&y).unwrap_or(Ordering::Equal);
                match self.direction {
                    Direction::Asc => ord,
                    Direction::Desc => ord.reverse(),
                }
            }
        }
    }
}

/// Stable multi-key sort.
pub fn sort_by_order<E>(entities: &mut [E], order: &[OrderBy<E>]) {
    if order.is_empty() {
        return;
    }
    entities.sort_by(|a, b| {
        order
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}
