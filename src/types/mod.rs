mod entity;
mod error;
mod options;
mod predicate;
mod rule;
mod schema;
mod type_tag;
mod value;

pub use entity::{Entity, Record, TypedEntity};
pub use error::{CoercionError, CompileError, EvaluationError};
pub use options::{CompileOptions, MissingKeyPolicy};
pub use predicate::Predicate;
pub(crate) use predicate::{CompiledLeaf, CompiledNode};
pub use rule::{Combinator, FieldExpr, Rule, RuleGroup, RuleNode, all, any, field};
pub use schema::{FieldDef, FieldType, Schema};
pub use type_tag::{TypeTag, UnknownTypeTag};
pub use value::Value;
