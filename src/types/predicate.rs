use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::entity::Entity;
use super::error::EvaluationError;
use super::options::MissingKeyPolicy;
use crate::evaluate::evaluate;
use crate::operators::Fragment;
use crate::resolve::FieldAccessor;

/// A compiled rule tree node.
#[derive(Debug, Clone)]
pub(crate) enum CompiledNode {
    Const(bool),
    And(Vec<CompiledNode>),
    Or(Vec<CompiledNode>),
    Not(Box<CompiledNode>),
    Leaf(CompiledLeaf),
}

/// One leaf: where to read, what to test, and how to treat missing keys.
#[derive(Debug, Clone)]
pub(crate) struct CompiledLeaf {
    pub(crate) accessor: FieldAccessor,
    pub(crate) fragment: Fragment,
    pub(crate) missing_key: MissingKeyPolicy,
    /// Element fragments are applied per element of list values.
    pub(crate) quantified: bool,
    pub(crate) label: String,
}

impl CompiledNode {
    pub(crate) fn leaf_count(&self) -> usize {
        match self {
            CompiledNode::Const(_) => 0,
            CompiledNode::And(children) | CompiledNode::Or(children) => {
                children.iter().map(CompiledNode::leaf_count).sum()
            }
            CompiledNode::Not(inner) => inner.leaf_count(),
            CompiledNode::Leaf(_) => 1,
        }
    }
}

impl fmt::Display for CompiledNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompiledNode::Const(true) => write!(f, "TRUE"),
            CompiledNode::Const(false) => write!(f, "FALSE"),
            CompiledNode::And(children) | CompiledNode::Or(children) => {
                let joiner = if matches!(self, CompiledNode::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        f.write_str(joiner)?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
            CompiledNode::Not(inner) => write!(f, "NOT {inner}"),
            CompiledNode::Leaf(leaf) => f.write_str(&leaf.label),
        }
    }
}

/// An immutable, reusable predicate over entities of type `E`.
///
/// Cheap to clone and safe to share across threads. Holds no reference to
/// the rule tree it was compiled from.
pub struct Predicate<E: ?Sized> {
    root: Arc<CompiledNode>,
    _entity: PhantomData<fn(&E) -> bool>,
}

impl<E: ?Sized> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        Self {
            root: Arc::clone(&self.root),
            _entity: PhantomData,
        }
    }
}

impl<E: ?Sized> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.root.to_string()).finish()
    }
}

impl<E: ?Sized> fmt::Display for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}

impl<E: Entity + ?Sized> Predicate<E> {
    pub(crate) fn new(root: CompiledNode) -> Self {
        Self {
            root: Arc::new(root),
            _entity: PhantomData,
        }
    }

    /// Evaluate against one entity.
    ///
    /// # Errors
    ///
    /// [`EvaluationError::DictionaryKeyMissing`] when a dictionary field lacks
    /// the requested key and the operator has no null-absent semantics, under
    /// [`MissingKeyPolicy::Error`].
    pub fn evaluate(&self, entity: &E) -> Result<bool, EvaluationError> {
        evaluate(&self.root, entity)
    }

    /// Like [`evaluate`](Self::evaluate), counting an evaluation error as a non-match.
    #[must_use]
    pub fn matches(&self, entity: &E) -> bool {
        self.evaluate(entity).unwrap_or(false)
    }

    /// Lazily keep the matching entities. Evaluation errors are yielded in place.
    pub fn filter<'a, I>(&'a self, entities: I) -> impl Iterator<Item = Result<&'a E, EvaluationError>>
    where
        I: IntoIterator<Item = &'a E>,
        I::IntoIter: 'a,
    {
        entities
            .into_iter()
            .filter_map(move |entity| match self.evaluate(entity) {
                Ok(true) => Some(Ok(entity)),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            })
    }

    /// Keep the matching entities of a slice, stopping at the first error.
    ///
    /// # Errors
    ///
    /// The first [`EvaluationError`] raised by any entity.
    pub fn filter_all<'a>(&self, entities: &'a [E]) -> Result<Vec<&'a E>, EvaluationError>
    where
        E: Sized,
    {
        let mut matched = Vec::new();
        for entity in entities {
            if self.evaluate(entity)? {
                matched.push(entity);
            }
        }
        Ok(matched)
    }

    /// Number of leaf comparisons in the compiled tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.root.leaf_count()
    }
}
