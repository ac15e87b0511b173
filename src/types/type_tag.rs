use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::schema::FieldType;

/// The value type a rule declares for its literal(s).
///
/// Drives which coercion path turns the literal into a [`Value`](super::Value)
/// and which built-in operators are applicable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TypeTag {
    #[default]
    #[serde(rename = "string")]
    String,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "double")]
    Double,
    #[serde(rename = "boolean")]
    Boolean,
    /// Date without a time-of-day component.
    #[serde(rename = "date")]
    Date,
    #[serde(rename = "datetime")]
    DateTime,
    #[serde(rename = "guid")]
    Guid,
    /// Untyped: the literal is passed through and the operator decides.
    #[serde(rename = "NA")]
    NA,
}

impl TypeTag {
    /// The wire name of this tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TypeTag::String => "string",
            TypeTag::Integer => "integer",
            TypeTag::Double => "double",
            TypeTag::Boolean => "boolean",
            TypeTag::Date => "date",
            TypeTag::DateTime => "datetime",
            TypeTag::Guid => "guid",
            TypeTag::NA => "NA",
        }
    }

    /// The tag a scalar field type naturally carries. `None` for composite
    /// types and for [`FieldType::Any`].
    #[must_use]
    pub fn natural(field_type: &FieldType) -> Option<TypeTag> {
        match field_type {
            FieldType::String => Some(TypeTag::String),
            FieldType::Int => Some(TypeTag::Integer),
            FieldType::Float => Some(TypeTag::Double),
            FieldType::Bool => Some(TypeTag::Boolean),
            FieldType::Date => Some(TypeTag::Date),
            FieldType::DateTime => Some(TypeTag::DateTime),
            FieldType::Guid => Some(TypeTag::Guid),
            FieldType::Any | FieldType::Record(_) | FieldType::Map(_) | FieldType::List(_) => None,
        }
    }

    /// Whether a literal of this tag can be compared with values of the
    /// given scalar field type without conversion.
    #[must_use]
    pub fn compatible_with(self, field_type: &FieldType) -> bool {
        match (self, field_type) {
            (TypeTag::NA, _) | (_, FieldType::Any) => true,
            (TypeTag::String, FieldType::String)
            | (TypeTag::Integer | TypeTag::Double, FieldType::Int | FieldType::Float)
            | (TypeTag::Boolean, FieldType::Bool)
            | (TypeTag::Date | TypeTag::DateTime, FieldType::Date | FieldType::DateTime)
            | (TypeTag::Guid, FieldType::Guid) => true,
            _ => false,
        }
    }

    /// Ordering comparisons are meaningless for booleans and identifiers.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        !matches!(self, TypeTag::Boolean | TypeTag::Guid)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a wire type name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown type tag '{0}'")]
pub struct UnknownTypeTag(pub String);

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" => Ok(TypeTag::String),
            "integer" | "int" | "long" => Ok(TypeTag::Integer),
            "double" | "float" | "decimal" => Ok(TypeTag::Double),
            "boolean" | "bool" => Ok(TypeTag::Boolean),
            "date" => Ok(TypeTag::Date),
            "datetime" => Ok(TypeTag::DateTime),
            "guid" | "uuid" => Ok(TypeTag::Guid),
            "na" => Ok(TypeTag::NA),
            _ => Err(UnknownTypeTag(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_wire_names() {
        assert_eq!("string".parse::<TypeTag>().unwrap(), TypeTag::String);
        assert_eq!("Integer".parse::<TypeTag>().unwrap(), TypeTag::Integer);
        assert_eq!("double".parse::<TypeTag>().unwrap(), TypeTag::Double);
        assert_eq!("datetime".parse::<TypeTag>().unwrap(), TypeTag::DateTime);
        assert_eq!("NA".parse::<TypeTag>().unwrap(), TypeTag::NA);
    }

    #[test]
    fn parse_unknown() {
        let err = "timespan".parse::<TypeTag>().unwrap_err();
        assert_eq!(err.to_string(), "unknown type tag 'timespan'");
    }

    #[test]
    fn display_round_trips_through_from_str() {
        for tag in [
            TypeTag::String,
            TypeTag::Integer,
            TypeTag::Double,
            TypeTag::Boolean,
            TypeTag::Date,
            TypeTag::DateTime,
            TypeTag::Guid,
            TypeTag::NA,
        ] {
            assert_eq!(tag.to_string().parse::<TypeTag>().unwrap(), tag);
        }
    }

    #[test]
    fn numeric_tags_are_compatible_with_both_number_types() {
        assert!(TypeTag::Integer.compatible_with(&FieldType::Float));
        assert!(TypeTag::Double.compatible_with(&FieldType::Int));
        assert!(!TypeTag::Integer.compatible_with(&FieldType::String));
        assert!(TypeTag::Date.compatible_with(&FieldType::DateTime));
        assert!(TypeTag::NA.compatible_with(&FieldType::Bool));
    }

    #[test]
    fn natural_tags() {
        assert_eq!(TypeTag::natural(&FieldType::Int), Some(TypeTag::Integer));
        assert_eq!(TypeTag::natural(&FieldType::Any), None);
        assert_eq!(
            TypeTag::natural(&FieldType::list(FieldType::String)),
            None
        );
    }
}
