use thiserror::Error;

use super::type_tag::TypeTag;

/// Compile-time failure. Any of these aborts the whole compilation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("invalid rule structure at {location}: {reason}")]
    InvalidRuleStructure { location: String, reason: String },

    #[error("field '{path}' not found: no member '{segment}'")]
    FieldNotFound { path: String, segment: String },

    #[error("unknown operator '{operator}'")]
    UnknownOperator { operator: String },

    #[error("invalid value for field '{field}': {source}")]
    Coercion {
        field: String,
        #[source]
        source: CoercionError,
    },

    #[error("operator '{operator}' is not applicable to field '{field}' of type {field_type}")]
    OperatorNotApplicable {
        operator: String,
        field: String,
        field_type: String,
    },

    #[error("declared type {declared} does not match field '{field}' of type {field_type}")]
    TypeMismatch {
        field: String,
        declared: TypeTag,
        field_type: String,
    },
}

/// A literal that cannot be turned into a value of its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("'{literal}' is not a valid {target}")]
    Invalid { literal: String, target: TypeTag },

    #[error("operator '{operator}' expects {expected} value(s), got {actual}")]
    Arity {
        operator: String,
        expected: usize,
        actual: usize,
    },

    #[error("literal {literal} cannot be used as {target}")]
    UnsupportedLiteral { literal: String, target: TypeTag },
}

/// Failure raised while evaluating a compiled predicate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvaluationError {
    #[error("key '{key}' missing from dictionary field '{path}'")]
    DictionaryKeyMissing { path: String, key: String },
}
