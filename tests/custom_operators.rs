use std::net::Ipv4Addr;

use rulesieve::operators::{Fragment, LeafInput, OperatorRegistry};
use rulesieve::{
    CoercionError, CompileError, CompileOptions, FieldType, OperatorDefinition, Record, Schema,
    TypeTag, Value, compile_with_schema, field,
};
use serde_json::json;

fn schema() -> Schema {
    Schema::new("Request")
        .field("client_ip", FieldType::String)
        .field("hops", FieldType::list(FieldType::String))
        .field("age", FieldType::Int)
}

fn parse_ip(leaf: &LeafInput<'_>, literal: &serde_json::Value) -> Result<Ipv4Addr, CompileError> {
    literal
        .as_str()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CompileError::Coercion {
            field: leaf.rule().field.clone(),
            source: CoercionError::Invalid {
                literal: literal.to_string(),
                target: TypeTag::String,
            },
        })
}

fn in_ip_range() -> OperatorDefinition {
    OperatorDefinition::new("in_ip_range", |leaf| {
        let literals = leaf.literals();
        let &[lower, upper] = literals.as_slice() else {
            return Err(CompileError::Coercion {
                field: leaf.rule().field.clone(),
                source: CoercionError::Arity {
                    operator: leaf.rule().operator.clone(),
                    expected: 2,
                    actual: literals.len(),
                },
            });
        };
        let (lower, upper) = (parse_ip(leaf, lower)?, parse_ip(leaf, upper)?);
        Ok(Fragment::any(move |v| {
            v.as_str()
                .and_then(|s| s.parse::<Ipv4Addr>().ok())
                .is_some_and(|ip| lower <= ip && ip <= upper)
        }))
    })
}

fn options() -> CompileOptions {
    CompileOptions::new().operator(in_ip_range())
}

#[test]
fn custom_operator_compiles_and_runs() {
    let node = field("client_ip").op("in_ip_range", json!(["10.0.0.0", "10.0.0.255"]));
    let pred = compile_with_schema::<Record>(&node, &schema(), &options()).unwrap();
    assert!(pred.matches(&Record::new().set("client_ip", "10.0.0.17")));
    assert!(!pred.matches(&Record::new().set("client_ip", "10.0.1.17")));
    assert!(!pred.matches(&Record::new().set("client_ip", "not an ip")));
}

#[test]
fn unknown_without_registration() {
    let node = field("client_ip").op("in_ip_range", json!(["10.0.0.0", "10.0.0.255"]));
    let err = compile_with_schema::<Record>(&node, &schema(), &CompileOptions::new()).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownOperator {
            operator: "in_ip_range".to_owned()
        }
    );
}

#[test]
fn registration_is_scoped_to_options() {
    let node = field("client_ip").op("in_ip_range", json!(["10.0.0.0", "10.0.0.255"]));
    assert!(compile_with_schema::<Record>(&node, &schema(), &options()).is_ok());
    assert!(compile_with_schema::<Record>(&node, &schema(), &CompileOptions::new()).is_err());
}

#[test]
fn custom_element_operator_is_quantified() {
    let node = field("hops").op("in_ip_range", json!(["192.168.0.0", "192.168.255.255"]));
    let pred = compile_with_schema::<Record>(&node, &schema(), &options()).unwrap();
    assert!(pred.matches(&Record::new().set("hops", vec!["8.8.8.8", "192.168.1.1"])));
    assert!(!pred.matches(&Record::new().set("hops", vec!["8.8.8.8"])));
}

#[test]
fn custom_builder_errors_abort_compile() {
    let node = field("client_ip").op("in_ip_range", json!(["10.0.0.0"]));
    assert!(matches!(
        compile_with_schema::<Record>(&node, &schema(), &options()),
        Err(CompileError::Coercion {
            source: CoercionError::Arity { expected: 2, actual: 1, .. },
            ..
        })
    ));
    let node = field("client_ip").op("in_ip_range", json!(["10.0.0.0", "nope"]));
    assert!(compile_with_schema::<Record>(&node, &schema(), &options()).is_err());
}

#[test]
fn custom_operator_overrides_builtin() {
    let lenient = OperatorDefinition::new("equal", |_| Ok(Fragment::whole(|_| true)));
    let options = CompileOptions::new().operator(lenient);
    let pred =
        compile_with_schema::<Record>(&field("age").equal(1), &schema(), &options).unwrap();
    assert!(pred.matches(&Record::new().set("age", 99_i64)));
}

#[test]
fn whole_and_element_shorthands() {
    let options = CompileOptions::new()
        .operator(OperatorDefinition::element("is_private", |v| {
            v.as_str().is_some_and(|s| s.starts_with("10."))
        }))
        .operator(OperatorDefinition::whole("has_many", |v| {
            matches!(v, Value::List(items) if items.len() > 2)
        }));
    let record = Record::new().set("hops", vec!["8.8.8.8", "10.1.1.1", "1.1.1.1"]);

    let private = compile_with_schema::<Record>(
        &field("hops").op("is_private", serde_json::Value::Null),
        &schema(),
        &options,
    )
    .unwrap();
    assert!(private.matches(&record));

    let many = compile_with_schema::<Record>(
        &field("hops").op("has_many", serde_json::Value::Null),
        &schema(),
        &options,
    )
    .unwrap();
    assert!(many.matches(&record));
}

#[test]
fn builder_sees_coercion_helpers() {
    let double = OperatorDefinition::new("twice", |leaf| {
        let target = leaf.single()?;
        Ok(Fragment::any(move |v| match (v, &target) {
            (Value::Int(a), Value::Int(b)) => *a == b * 2,
            _ => false,
        }))
    });
    let options = CompileOptions::new()
        .locale(rulesieve::Locale::from_tag("de-DE").unwrap())
        .operator(double);
    let node = field("age").typed(TypeTag::Integer).op("twice", "1.000");
    let pred = compile_with_schema::<Record>(&node, &schema(), &options).unwrap();
    assert!(pred.matches(&Record::new().set("age", 2000_i64)));
}

#[test]
fn registry_names_are_sorted() {
    let registry = OperatorRegistry::builtin().with(in_ip_range());
    let names = registry.names();
    assert_eq!(names.len(), 21);
    assert!(names.windows(2).all(|w| w[0] < w[1]));
    assert!(names.contains(&"in_ip_range"));
}
