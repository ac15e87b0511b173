use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::schema::Schema;
use super::value::Value;

/// Read access to the top-level members of an entity.
///
/// Implementations return the member's current value by its canonical
/// (schema) name, or `None` when the entity has no such member. Nested
/// objects are returned as [`Value::Record`], maps as [`Value::Map`] and
/// collections as [`Value::List`].
pub trait Entity {
    fn field(&self, name: &str) -> Option<Value>;
}

/// An [`Entity`] whose member layout is known statically.
///
/// # Example
///
/// ```
/// use rulesieve::{Entity, FieldType, Schema, TypedEntity, Value};
///
/// struct Person {
///     name: String,
///     age: i64,
/// }
///
/// impl Entity for Person {
///     fn field(&self, name: &str) -> Option<Value> {
///         match name {
///             "name" => Some(self.name.as_str().into()),
///             "age" => Some(self.age.into()),
///             _ => None,
///         }
///     }
/// }
///
/// impl TypedEntity for Person {
///     fn schema() -> Schema {
///         Schema::new("Person")
///             .field("name", FieldType::String)
///             .field("age", FieldType::Int)
///     }
/// }
/// ```
pub trait TypedEntity: Entity {
    fn schema() -> Schema;
}

impl<T: Entity + ?Sized> Entity for &T {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl<T: Entity + ?Sized> Entity for Box<T> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

impl<T: Entity + ?Sized> Entity for Arc<T> {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }
}

/// A dynamic entity: an ordered map from member name to [`Value`].
///
/// Used for nested objects inside typed entities and as a schemaless entity
/// with [`compile_with_schema`](crate::compile_with_schema). Dotted paths
/// passed to [`set`](Self::set) create nested records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every schema member of a typed entity.
    #[must_use]
    pub fn capture<E: TypedEntity>(entity: &E) -> Self {
        let mut record = Record::new();
        for def in E::schema().fields() {
            if let Some(value) = entity.field(def.name()) {
                record.fields.insert(def.name().to_owned(), value);
            }
        }
        record
    }

    /// Set a value at a dot-separated path. Creates intermediate records as needed.
    #[must_use]
    pub fn set(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert(path, value.into());
        self
    }

    /// Insert a value at a dot-separated path (mutable reference version).
    pub fn insert(&mut self, path: &str, value: Value) {
        let segments: Vec<&str> = path.split('.').collect();
        Self::insert_recursive(&mut self.fields, &segments, value);
    }

    /// Look up a direct member.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Remove and return a direct member.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn insert_recursive(map: &mut BTreeMap<String, Value>, segments: &[&str], value: Value) {
        match segments {
            [] => {}
            [last] => {
                map.insert((*last).to_owned(), value);
            }
            [first, rest @ ..] => {
                let entry = map
                    .entry((*first).to_owned())
                    .or_insert_with(|| Value::Record(Record::new()));
                if let Value::Record(nested) = entry {
                    Self::insert_recursive(&mut nested.fields, rest, value);
                } else {
                    let mut nested = Record::new();
                    Self::insert_recursive(&mut nested.fields, rest, value);
                    *entry = Value::Record(nested);
                }
            }
        }
    }
}

impl Entity for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}
