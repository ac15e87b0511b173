use std::fmt;

/// Static type of an entity member.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Dynamically typed; nested steps are resolved against the runtime value.
    Any,
    String,
    Int,
    Float,
    Bool,
    Date,
    DateTime,
    Guid,
    /// A nested object with its own members.
    Record(Schema),
    /// A string-keyed map. Path steps into it are keys, not members.
    Map(Box<FieldType>),
    /// An ordered collection of elements.
    List(Box<FieldType>),
}

impl FieldType {
    #[must_use]
    pub fn list(element: FieldType) -> Self {
        FieldType::List(Box::new(element))
    }

    #[must_use]
    pub fn map(value: FieldType) -> Self {
        FieldType::Map(Box::new(value))
    }

    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, FieldType::List(_))
    }

    /// The element type after peeling every list layer.
    #[must_use]
    pub fn element(&self) -> &FieldType {
        let mut current = self;
        while let FieldType::List(inner) = current {
            current = inner;
        }
        current
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Any => write!(f, "any"),
            FieldType::String => write!(f, "string"),
            FieldType::Int => write!(f, "int"),
            FieldType::Float => write!(f, "float"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Date => write!(f, "date"),
            FieldType::DateTime => write!(f, "datetime"),
            FieldType::Guid => write!(f, "guid"),
            FieldType::Record(schema) => write!(f, "{}", schema.name()),
            FieldType::Map(value) => write!(f, "map<{value}>"),
            FieldType::List(element) => write!(f, "list<{element}>"),
        }
    }
}

/// A named member of a [`Schema`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    name: String,
    field_type: FieldType,
}

impl FieldDef {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }
}

/// Describes the members of an entity type.
///
/// # Example
///
/// ```
/// use rulesieve::{FieldType, Schema};
///
/// let address = Schema::new("Address").field("city", FieldType::String);
/// let person = Schema::new("Person")
///     .field("name", FieldType::String)
///     .field("age", FieldType::Int)
///     .field("address", FieldType::Record(address))
///     .field("tags", FieldType::list(FieldType::String));
///
/// assert_eq!(person.fields().len(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    name: String,
    fields: Vec<FieldDef>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Add a member. A later definition with the same name replaces the earlier one.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        let name = name.into();
        self.fields.retain(|f| f.name != name);
        self.fields.push(FieldDef { name, field_type });
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Find a member by name.
    ///
    /// An exact match wins. Otherwise a case-insensitive match is accepted
    /// only when it is unique.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&FieldDef> {
        if let Some(exact) = self.fields.iter().find(|f| f.name == name) {
            return Some(exact);
        }
        let wanted = name.to_lowercase();
        let mut folded = self
            .fields
            .iter()
            .filter(|f| f.name.to_lowercase() == wanted);
        match (folded.next(), folded.next()) {
            (Some(only), None) => Some(only),
            _ => None,
        }
    }
}
