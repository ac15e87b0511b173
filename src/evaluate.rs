use crate::operators::{Fragment, MissingKey, Quantifier};
use crate::resolve::Lookup;
use crate::types::{CompiledLeaf, CompiledNode};
use crate::{Entity, EvaluationError, MissingKeyPolicy, Value};

/// Evaluate a compiled tree, short-circuiting AND and OR in child order.
pub(crate) fn evaluate<E: Entity + ?Sized>(
    node: &CompiledNode,
    entity: &E,
) -> Result<bool, EvaluationError> {
    match node {
        CompiledNode::Const(value) => Ok(*value),
        CompiledNode::And(children) => {
            for child in children {
                if !evaluate(child, entity)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        CompiledNode::Or(children) => {
            for child in children {
                if evaluate(child, entity)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        CompiledNode::Not(inner) => Ok(!evaluate(inner, entity)?),
        CompiledNode::Leaf(leaf) => eval_leaf(leaf, entity),
    }
}

fn eval_leaf<E: Entity + ?Sized>(leaf: &CompiledLeaf, entity: &E) -> Result<bool, EvaluationError> {
    let value = match leaf.accessor.try_get(entity) {
        Lookup::Found(value) => value,
        Lookup::Missing { key, as_null } => match (leaf.fragment.on_missing(), leaf.missing_key) {
            // A whole-value null test sees the absent entry itself.
            (MissingKey::AsNull, _) if matches!(leaf.fragment, Fragment::Whole { .. }) => {
                Value::Null
            }
            (MissingKey::AsNull, _) | (MissingKey::Policy, MissingKeyPolicy::Null) => as_null,
            (MissingKey::Policy, MissingKeyPolicy::Error) => {
                tracing::trace!(path = leaf.accessor.path(), key, "dictionary key missing");
                return Err(EvaluationError::DictionaryKeyMissing {
                    path: leaf.accessor.path().to_owned(),
                    key,
                });
            }
        },
    };

    Ok(match &leaf.fragment {
        Fragment::Whole { test, .. } => test(&value),
        Fragment::Element {
            test, quantifier, ..
        } => match (&value, leaf.quantified) {
            (Value::List(items), true) => match quantifier {
                Quantifier::Any => items.iter().any(|item| test(item)),
                Quantifier::All => items.iter().all(|item| test(item)),
            },
            _ => test(&value),
        },
    })
}
