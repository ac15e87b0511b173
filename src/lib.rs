//! Compile rule trees into reusable, thread-safe predicates.
//!
//! A rule tree is a nest of AND/OR groups over leaf comparisons such as
//! `age greater 18` or `tags contains "vip"`. It can be built in code with
//! [`field`], [`all`] and [`any`], or read from the JSON shape produced by
//! query-builder front ends. [`compile`] checks the tree against the entity's
//! [`Schema`], coerces every literal once using the configured [`Locale`], and
//! returns a [`Predicate`] that evaluates without further parsing.
//!
//! ```
//! use rulesieve::{CompileOptions, FieldType, Record, Schema, any, compile_with_schema, field};
//!
//! let schema = Schema::new("Order")
//!     .field("total", FieldType::Float)
//!     .field("tags", FieldType::list(FieldType::String));
//! let rules = any([field("total").greater(100.0), field("tags").contains("vip")]);
//! let pred = compile_with_schema::<Record>(&rules, &schema, &CompileOptions::new()).unwrap();
//!
//! let order = Record::new().set("total", 20.0).set("tags", vec!["vip"]);
//! assert!(pred.matches(&order));
//! ```

pub mod coerce;
mod compile;
mod error;
mod evaluate;
pub mod operators;
pub mod resolve;
mod types;
mod wire;

pub use coerce::{DateOrder, Locale, LocaleError};
pub use compile::{compile, compile_json, compile_with_schema};
pub use error::SieveError;
pub use operators::{Fragment, LeafInput, OperatorDefinition, OperatorRegistry};
pub use types::{
    CoercionError, Combinator, CompileError, CompileOptions, Entity, EvaluationError, FieldDef,
    FieldExpr, FieldType, MissingKeyPolicy, Predicate, Record, Rule, RuleGroup, RuleNode, Schema,
    TypeTag, TypedEntity, UnknownTypeTag, Value, all, any, field,
};
