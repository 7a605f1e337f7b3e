//! Specification trees.
//!
//! A [`Specification`] is an immutable, reference-counted tree of predicates
//! joined by AND/OR/NOT. Combinators never touch their operands; they allocate
//! a new root that shares the existing subtrees, so one specification can be
//! reused from many call sites and threads.

use super::predicate::Predicate;
use crate::error::{SpecResult, SpecificationError};
use crate::query::{Condition, QueryTranslator};
use std::fmt;
use std::sync::Arc;

/// Node of a specification tree.
///
/// Closed set: translators match on it exhaustively.
pub enum Node<E> {
    Predicate(Predicate<E>),
    /// At least one child; a single child behaves as the child itself.
    And(Vec<Specification<E>>),
    /// At least one child; a single child behaves as the child itself.
    Or(Vec<Specification<E>>),
    Not(Specification<E>),
}

/// Composable filter over entities of type `E`.
pub struct Specification<E> {
    node: Arc<Node<E>>,
}

impl<E> Clone for Specification<E> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
        }
    }
}

impl<E> From<Predicate<E>> for Specification<E> {
    fn from(predicate: Predicate<E>) -> Self {
        Self::from_node(Node::Predicate(predicate))
    }
}

impl<E> Specification<E> {
    fn from_node(node: Node<E>) -> Self {
        Self {
            node: Arc::new(node),
        }
    }

    pub fn node(&self) -> &Node<E> {
        &self.node
    }

    /// Both `self` and `other` must hold. `self` is evaluated first.
    pub fn and(&self, other: &Specification<E>) -> Specification<E> {
        Self::from_node(Node::And(vec![self.clone(), other.clone()]))
    }

    /// Either `self` or `other` must hold. `self` is evaluated first.
    pub fn or(&self, other: &Specification<E>) -> Specification<E> {
        Self::from_node(Node::Or(vec![self.clone(), other.clone()]))
    }

    pub fn not(&self) -> Specification<E> {
        Self::from_node(Node::Not(self.clone()))
    }

    /// Conjunction of every spec in `specs`, in order.
    ///
    /// Fails with [`SpecificationError::EmptyCombinator`] if `specs` is empty.
    pub fn all<I>(specs: I) -> SpecResult<Specification<E>>
    where
        I: IntoIterator<Item = Specification<E>>,
    {
        let children: Vec<_> = specs.into_iter().collect();
        if children.is_empty() {
            return Err(SpecificationError::EmptyCombinator { combinator: "all" });
        }
        Ok(Self::from_node(Node::And(children)))
    }

    /// Disjunction of every spec in `specs`, in order.
    ///
    /// Fails with [`SpecificationError::EmptyCombinator`] if `specs` is empty.
    pub fn any<I>(specs: I) -> SpecResult<Specification<E>>
    where
        I: IntoIterator<Item = Specification<E>>,
    {
        let children: Vec<_> = specs.into_iter().collect();
        if children.is_empty() {
            return Err(SpecificationError::EmptyCombinator { combinator: "any" });
        }
        Ok(Self::from_node(Node::Or(children)))
    }

    /// Evaluate against one entity.
    ///
    /// Children run left to right; AND stops at the first false child, OR at
    /// the first true one.
    pub fn is_satisfied_by(&self, entity: &E) -> bool {
        match self.node() {
            Node::Predicate(predicate) => predicate.evaluate(entity),
            Node::And(children) => children.iter().all(|c| c.is_satisfied_by(entity)),
            Node::Or(children) => children.iter().any(|c| c.is_satisfied_by(entity)),
            Node::Not(child) => !child.is_satisfied_by(entity),
        }
    }

    /// Translate into a storage-native filter.
    ///
    /// Walks the tree bottom-up and hands each node to `translator`; the
    /// first error aborts the walk.
    pub fn to_query_fragment<T>(&self, translator: &T) -> SpecResult<T::Filter>
    where
        T: QueryTranslator + ?Sized,
    {
        match self.node() {
            Node::Predicate(predicate) => translator.condition(Condition::from(predicate)),
            Node::And(children) => {
                let parts = children
                    .iter()
                    .map(|c| c.to_query_fragment(translator))
                    .collect::<SpecResult<Vec<_>>>()?;
                translator.all(parts)
            }
            Node::Or(children) => {
                let parts = children
                    .iter()
                    .map(|c| c.to_query_fragment(translator))
                    .collect::<SpecResult<Vec<_>>>()?;
                translator.any(parts)
            }
            Node::Not(child) => translator.negate(child.to_query_fragment(translator)?),
        }
    }

    /// Number of predicates in the tree.
    pub fn predicate_count(&self) -> usize {
        match self.node() {
            Node::Predicate(_) => 1,
            Node::And(children) | Node::Or(children) => {
                children.iter().map(Specification::predicate_count).sum()
            }
            Node::Not(child) => child.predicate_count(),
        }
    }

    /// Distinct field names in first-seen order. Carries no operand values,
    /// so it is safe to put in caller-facing errors.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        self.collect_field_names(&mut names);
        names
    }

    fn collect_field_names(&self, names: &mut Vec<&'static str>) {
        match self.node() {
            Node::Predicate(predicate) => {
                let name = predicate.field().name();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
            Node::And(children) | Node::Or(children) => {
                for child in children {
                    child.collect_field_names(names);
                }
            }
            Node::Not(child) => child.collect_field_names(names),
        }
    }
}

fn write_joined<E>(
    f: &mut fmt::Formatter<'_>,
    children: &[Specification<E>],
    sep: &str,
) -> fmt::Result {
    if let [only] = children {
        return write!(f, "{}", only);
    }
    write!(f, "(")?;
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", child)?;
    }
    write!(f, ")")
}

impl<E> fmt::Display for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            Node::Predicate(predicate) => write!(f, "{}", predicate),
            Node::And(children) => write_joined(f, children, "AND"),
            Node::Or(children) => write_joined(f, children, "OR"),
            Node::Not(child) => match child.node() {
                Node::And(children) | Node::Or(children) if children.len() > 1 => {
                    write!(f, "NOT {}", child)
                }
                _ => write!(f, "NOT ({})", child),
            },
        }
    }
}

impl<E> fmt::Debug for Specification<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Specification")
            .field(&format_args!("{}", self))
            .finish()
    }
}
