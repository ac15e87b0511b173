//! Field path resolution.
//!
//! A path such as `address.city` or `attributes.color` is resolved once per
//! compilation against a [`Schema`] into a [`FieldAccessor`]: a list of
//! explicit steps plus the static type they lead to. Reading through the
//! accessor never consults the schema again.

use std::fmt;

use crate::{CompileError, Entity, FieldType, Record, Schema, Value};

/// One step of a resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// A named member of a record, by its canonical name.
    Member(String),
    /// A dictionary key, taken verbatim.
    Key(String),
    /// A step below an untyped member: a member of a record or a key of a map,
    /// decided by the value found at evaluation time.
    Dynamic(String),
}

/// Result of reading a field from an entity.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Found(Value),
    /// A dictionary step found no entry for `key`. `as_null` is the value
    /// read with every absent entry taken as null.
    Missing { key: String, as_null: Value },
}

impl Lookup {
    /// The value read, or `None` for a missing dictionary key.
    #[must_use]
    pub fn into_value(self) -> Option<Value> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::Missing { .. } => None,
        }
    }
}

/// Reads one field path from entities of a fixed type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessor {
    path: String,
    steps: Vec<Step>,
    field_type: FieldType,
}

/// Resolve `path` against `schema`.
///
/// Member names match exactly first and case-insensitively only when that
/// match is unique. A step into a map consumes the rest of the path as the
/// key. Member steps through a list project over its elements, so the
/// resolved type stays a list.
///
/// # Errors
///
/// [`CompileError::FieldNotFound`] naming the first segment that does not resolve.
pub fn resolve(schema: &Schema, path: &str) -> Result<FieldAccessor, CompileError> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut steps = Vec::with_capacity(segments.len());
    let field_type = walk_record(schema, &segments, path, &mut steps)?;
    Ok(FieldAccessor {
        path: path.to_owned(),
        steps,
        field_type,
    })
}

fn walk_record(
    schema: &Schema,
    segments: &[&str],
    path: &str,
    steps: &mut Vec<Step>,
) -> Result<FieldType, CompileError> {
    let Some((segment, rest)) = segments.split_first() else {
        return Ok(FieldType::Record(schema.clone()));
    };
    let def = schema
        .find(segment)
        .ok_or_else(|| not_found(path, segment))?;
    steps.push(Step::Member(def.name().to_owned()));
    walk(def.field_type(), rest, path, steps)
}

fn walk(
    current: &FieldType,
    segments: &[&str],
    path: &str,
    steps: &mut Vec<Step>,
) -> Result<FieldType, CompileError> {
    let Some(segment) = segments.first() else {
        return Ok(current.clone());
    };
    match current {
        FieldType::Record(schema) => walk_record(schema, segments, path, steps),
        FieldType::Map(value_type) => {
            steps.push(Step::Key(segments.join(".")));
            Ok((**value_type).clone())
        }
        FieldType::List(element) => {
            let projected = walk(element, segments, path, steps)?;
            Ok(FieldType::list(projected.element().clone()))
        }
        FieldType::Any => {
            steps.extend(segments.iter().map(|s| Step::Dynamic((*s).to_owned())));
            Ok(FieldType::Any)
        }
        _ => Err(not_found(path, segment)),
    }
}

fn not_found(path: &str, segment: &str) -> CompileError {
    CompileError::FieldNotFound {
        path: path.to_owned(),
        segment: segment.to_owned(),
    }
}

impl FieldAccessor {
    /// The path as written in the rule.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// The static type of the value this accessor reads.
    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        self.field_type.is_collection()
    }

    /// Read the field from `entity`.
    ///
    /// Stepping through null yields null. A dictionary key absent anywhere
    /// along the path, including inside a list projection, yields
    /// [`Lookup::Missing`] naming the first such key.
    pub fn try_get<E: Entity + ?Sized>(&self, entity: &E) -> Lookup {
        let Some((first, rest)) = self.steps.split_first() else {
            return Lookup::Found(Value::Null);
        };
        let mut current = match first {
            Step::Member(name) | Step::Dynamic(name) | Step::Key(name) => {
                entity.field(name).unwrap_or_default()
            }
        };
        let mut missing = None;
        for step in rest {
            current = match apply(current, step) {
                Lookup::Found(next) => next,
                Lookup::Missing { key, as_null } => {
                    missing.get_or_insert(key);
                    as_null
                }
            };
        }
        match missing {
            Some(key) => Lookup::Missing {
                key,
                as_null: current,
            },
            None => Lookup::Found(current),
        }
    }
}

fn apply(value: Value, step: &Step) -> Lookup {
    match (value, step) {
        (Value::Null, _) => Lookup::Found(Value::Null),
        (Value::List(items), _) => {
            let (projected, missing) = project(items, step);
            match missing {
                Some(key) => Lookup::Missing {
                    key,
                    as_null: Value::List(projected),
                },
                None => Lookup::Found(Value::List(projected)),
            }
        }
        (Value::Record(mut record), Step::Member(name)) => {
            Lookup::Found(record.take(name).unwrap_or_default())
        }
        (Value::Record(record), Step::Dynamic(name)) => Lookup::Found(dynamic_member(record, name)),
        (Value::Map(mut map), Step::Key(key) | Step::Dynamic(key)) => match map.remove(key) {
            Some(value) => Lookup::Found(value),
            None => missing_key(key),
        },
        (Value::Record(mut record), Step::Key(key)) => match record.take(key) {
            Some(value) => Lookup::Found(value),
            None => missing_key(key),
        },
        _ => Lookup::Found(Value::Null),
    }
}

fn missing_key(key: &str) -> Lookup {
    Lookup::Missing {
        key: key.to_owned(),
        as_null: Value::Null,
    }
}

/// Apply `step` to every element, flattening nested lists. Also returns the
/// first key found missing; its element is kept as null.
fn project(items: Vec<Value>, step: &Step) -> (Vec<Value>, Option<String>) {
    let mut out = Vec::with_capacity(items.len());
    let mut missing = None;
    for item in items {
        let value = match apply(item, step) {
            Lookup::Found(value) => value,
            Lookup::Missing { key, as_null } => {
                missing.get_or_insert(key);
                as_null
            }
        };
        match value {
            Value::List(nested) => out.extend(nested),
            value => out.push(value),
        }
    }
    (out, missing)
}

fn dynamic_member(mut record: Record, name: &str) -> Value {
    if let Some(value) = record.take(name) {
        return value;
    }
    let wanted = name.to_lowercase();
    let folded: Vec<String> = record
        .iter()
        .filter(|(k, _)| k.to_lowercase() == wanted)
        .map(|(k, _)| k.to_owned())
        .collect();
    match folded.as_slice() {
        [only] => record.take(only).unwrap_or_default(),
        _ => Value::Null,
    }
}

impl fmt::Display for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.field_type)
    }
}
