use std::cmp::Ordering;

use serde_json::Value as Literal;

use super::{Fragment, LeafInput, OperatorDefinition, ValueView};
use crate::{CoercionError, CompileError, TypeTag, Value};

pub(super) fn definitions() -> Vec<OperatorDefinition> {
    vec![
        OperatorDefinition::new("equal", equal),
        OperatorDefinition::new("not_equal", not_equal),
        OperatorDefinition::new("less", |leaf| ordering(leaf, |o| o == Ordering::Less)),
        OperatorDefinition::new("less_or_equal", |leaf| {
            ordering(leaf, |o| o != Ordering::Greater)
        }),
        OperatorDefinition::new("greater", |leaf| {
            ordering(leaf, |o| o == Ordering::Greater)
        }),
        OperatorDefinition::new("greater_or_equal", |leaf| {
            ordering(leaf, |o| o != Ordering::Less)
        }),
        OperatorDefinition::new("between", |leaf| between(leaf, false)),
        OperatorDefinition::new("not_between", |leaf| between(leaf, true)),
        OperatorDefinition::new("in", |leaf| membership(leaf, false)),
        OperatorDefinition::new("not_in", |leaf| membership(leaf, true)),
        OperatorDefinition::new("is_null", |_| {
            Ok(Fragment::whole(Value::is_null).null_absent())
        }),
        OperatorDefinition::new("is_not_null", |_| {
            Ok(Fragment::whole(|v| !v.is_null()).null_absent())
        }),
        OperatorDefinition::new("is_empty", |_| {
            Ok(Fragment::whole(Value::is_blank).null_absent())
        }),
        OperatorDefinition::new("is_not_empty", |_| {
            Ok(Fragment::whole(|v| !v.is_blank()).null_absent())
        }),
        OperatorDefinition::new("contains", |leaf| text(leaf, false, |h, n| h.contains(n))),
        OperatorDefinition::new("not_contains", |leaf| {
            text(leaf, true, |h, n| h.contains(n))
        }),
        OperatorDefinition::new("begins_with", |leaf| {
            text(leaf, false, |h, n| h.starts_with(n))
        }),
        OperatorDefinition::new("not_begins_with", |leaf| {
            text(leaf, true, |h, n| h.starts_with(n))
        }),
        OperatorDefinition::new("ends_with", |leaf| text(leaf, false, |h, n| h.ends_with(n))),
        OperatorDefinition::new("not_ends_with", |leaf| {
            text(leaf, true, |h, n| h.ends_with(n))
        }),
    ]
}

/// The `not_*` form of an element test: no element may satisfy the positive
/// test, and an absent key reads as null.
fn negated(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Fragment {
    Fragment::all(move |v| !test(v)).null_absent()
}

fn equal(leaf: &LeafInput<'_>) -> Result<Fragment, CompileError> {
    let target = leaf.single()?;
    if target.is_null() {
        return Ok(Fragment::whole(Value::is_null).null_absent());
    }
    let view = leaf.view()?;
    Ok(Fragment::any(move |v| view.equals(v, &target)))
}

fn not_equal(leaf: &LeafInput<'_>) -> Result<Fragment, CompileError> {
    let target = leaf.single()?;
    if target.is_null() {
        return Ok(Fragment::whole(|v| !v.is_null()).null_absent());
    }
    let view = leaf.view()?;
    Ok(negated(move |v| view.equals(v, &target)))
}

fn ordering(
    leaf: &LeafInput<'_>,
    accept: impl Fn(Ordering) -> bool + Send + Sync + 'static,
) -> Result<Fragment, CompileError> {
    let view = leaf.ordered_view()?;
    let target = leaf.single()?;
    Ok(Fragment::any(move |v| view.compare(v, &target).is_some_and(&accept)))
}

fn in_range(view: &ValueView, v: &Value, lower: &Value, upper: &Value) -> bool {
    view.compare(v, lower).is_some_and(|o| o != Ordering::Less)
        && view.compare(v, upper).is_some_and(|o| o != Ordering::Greater)
}

fn between(leaf: &LeafInput<'_>, negate: bool) -> Result<Fragment, CompileError> {
    let view = leaf.ordered_view()?;
    let (lower, upper) = leaf.pair()?;
    let test = move |v: &Value| in_range(&view, v, &lower, &upper);
    Ok(if negate {
        negated(test)
    } else {
        Fragment::any(test)
    })
}

fn membership(leaf: &LeafInput<'_>, negate: bool) -> Result<Fragment, CompileError> {
    let view = leaf.view()?;
    let targets = leaf.list()?;
    let test = move |v: &Value| targets.iter().any(|t| view.equals(v, t));
    Ok(if negate {
        negated(test)
    } else {
        Fragment::any(test)
    })
}

fn text(
    leaf: &LeafInput<'_>,
    negate: bool,
    matches: impl Fn(&str, &str) -> bool + Send + Sync + 'static,
) -> Result<Fragment, CompileError> {
    let view = leaf.text_view()?;
    let target = leaf.single()?;
    let needle = view.text(&target).ok_or_else(|| CompileError::Coercion {
        field: leaf.rule().field.clone(),
        source: CoercionError::Invalid {
            literal: literal_text(&leaf.rule().value),
            target: TypeTag::String,
        },
    })?;
    let test = move |v: &Value| view.text(v).is_some_and(|hay| matches(&hay, &needle));
    Ok(if negate {
        negated(test)
    } else {
        Fragment::any(test)
    })
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::operators::{MissingKey, OperatorRegistry, Quantifier};
    use crate::resolve::resolve;
    use crate::{CompileOptions, FieldType, Rule, Schema};

    fn schema() -> Schema {
        Schema::new("T")
            .field("name", FieldType::String)
            .field("age", FieldType::Int)
            .field("score", FieldType::Float)
            .field("tags", FieldType::list(FieldType::String))
            .field("attrs", FieldType::map(FieldType::String))
    }

    fn build(rule: Rule) -> Result<Fragment, CompileError> {
        build_with(rule, &CompileOptions::new())
    }

    fn build_with(rule: Rule, options: &CompileOptions) -> Result<Fragment, CompileError> {
        let accessor = resolve(&schema(), &rule.field)?;
        let input = LeafInput::new(&rule, &accessor, options);
        OperatorRegistry::builtin().lookup(&rule.operator)?.build(&input)
    }

    fn run(fragment: &Fragment, value: &Value) -> bool {
        match fragment {
            Fragment::Element { test, .. } | Fragment::Whole { test, .. } => test(value),
        }
    }

    #[test]
    fn equal_is_case_insensitive_by_default() {
        let f = build(Rule::new("name", "equal", TypeTag::String, "ada")).unwrap();
        assert!(run(&f, &Value::from("ADA")));
        assert!(!run(&f, &Value::from("bob")));
        assert!(!run(&f, &Value::Null));
    }

    #[test]
    fn equal_null_literal_tests_null() {
        let f = build(Rule::new("name", "equal", TypeTag::String, Literal::Null)).unwrap();
        assert!(run(&f, &Value::Null));
        assert!(!run(&f, &Value::from("x")));
    }

    #[test]
    fn not_equal_is_all_quantified_and_null_absent() {
        let f = build(Rule::new("tags", "not_equal", TypeTag::String, "b")).unwrap();
        match &f {
            Fragment::Element {
                quantifier,
                on_missing,
                ..
            } => {
                assert_eq!(*quantifier, Quantifier::All);
                assert_eq!(*on_missing, MissingKey::AsNull);
            }
            other => panic!("expected element fragment, got {other:?}"),
        }
        assert!(run(&f, &Value::Null));
        assert!(!run(&f, &Value::from("b")));
    }

    #[test]
    fn ordering_across_int_and_double() {
        let f = build(Rule::new("age", "greater", TypeTag::Double, 17.5)).unwrap();
        assert!(run(&f, &Value::Int(18)));
        assert!(!run(&f, &Value::Int(17)));
        assert!(!run(&f, &Value::Null));
    }

    #[test]
    fn ordering_bounds() {
        let le = build(Rule::new("age", "less_or_equal", TypeTag::Integer, 5)).unwrap();
        assert!(run(&le, &Value::Int(5)));
        assert!(!run(&le, &Value::Int(6)));
        let ge = build(Rule::new("age", "greater_or_equal", TypeTag::Integer, 5)).unwrap();
        assert!(run(&ge, &Value::Int(5)));
        assert!(!run(&ge, &Value::Int(4)));
    }

    #[test]
    fn between_is_inclusive() {
        let f = build(Rule::new("age", "between", TypeTag::Integer, json!([1, 3]))).unwrap();
        assert!(run(&f, &Value::Int(1)));
        assert!(run(&f, &Value::Int(3)));
        assert!(!run(&f, &Value::Int(4)));
        let not = build(Rule::new("age", "not_between", TypeTag::Integer, json!([1, 3]))).unwrap();
        assert!(run(&not, &Value::Int(4)));
        assert!(!run(&not, &Value::Int(2)));
    }

    #[test]
    fn between_arity() {
        assert!(matches!(
            build(Rule::new("age", "between", TypeTag::Integer, json!([1]))),
            Err(CompileError::Coercion {
                source: CoercionError::Arity { .. },
                ..
            })
        ));
        assert!(build(Rule::new("age", "not_between", TypeTag::Integer, 1)).is_err());
    }

    #[test]
    fn in_and_not_in() {
        let f = build(Rule::new("age", "in", TypeTag::Integer, json!([1, 2]))).unwrap();
        assert!(run(&f, &Value::Int(2)));
        assert!(!run(&f, &Value::Int(3)));
        let not = build(Rule::new("age", "not_in", TypeTag::Integer, json!([1, 2]))).unwrap();
        assert!(run(&not, &Value::Int(3)));
    }

    #[test]
    fn empty_membership() {
        let f = build(Rule::new("age", "in", TypeTag::Integer, json!([]))).unwrap();
        assert!(!run(&f, &Value::Int(1)));
        let not = build(Rule::new("age", "not_in", TypeTag::Integer, json!([]))).unwrap();
        assert!(run(&not, &Value::Int(1)));
    }

    #[test]
    fn nullness_and_emptiness() {
        let is_null = build(Rule::new("name", "is_null", TypeTag::NA, Literal::Null)).unwrap();
        assert!(run(&is_null, &Value::Null));
        let is_empty = build(Rule::new("tags", "is_empty", TypeTag::NA, Literal::Null)).unwrap();
        assert!(run(&is_empty, &Value::List(vec![])));
        assert!(run(&is_empty, &Value::from("")));
        assert!(!run(&is_empty, &Value::from(vec!["a"])));
        let not_empty = build(Rule::new("attrs", "is_not_empty", TypeTag::NA, Literal::Null)).unwrap();
        let mut map = BTreeMap::new();
        map.insert("k".to_owned(), Value::from("v"));
        assert!(run(&not_empty, &Value::Map(map)));
    }

    #[test]
    fn text_family() {
        let contains = build(Rule::new("name", "contains", TypeTag::String, "DA")).unwrap();
        assert!(run(&contains, &Value::from("Ada")));
        let begins = build(Rule::new("name", "begins_with", TypeTag::String, "ad")).unwrap();
        assert!(run(&begins, &Value::from("Ada")));
        let not_begins = build(Rule::new("name", "not_begins_with", TypeTag::String, "ad")).unwrap();
        assert!(!run(&not_begins, &Value::from("Ada")));
        let ends = build(Rule::new("name", "ends_with", TypeTag::String, "da")).unwrap();
        assert!(run(&ends, &Value::from("Ada")));
        let not_ends = build(Rule::new("name", "not_ends_with", TypeTag::String, "x")).unwrap();
        assert!(run(&not_ends, &Value::from("Ada")));
        assert!(!run(&contains, &Value::Null));
    }

    #[test]
    fn text_respects_case_sensitivity() {
        let options = CompileOptions::new().case_sensitive(true);
        let f = build_with(Rule::new("name", "contains", TypeTag::String, "DA"), &options).unwrap();
        assert!(!run(&f, &Value::from("Ada")));
    }

    #[test]
    fn text_on_number_requires_conversion() {
        assert!(matches!(
            build(Rule::new("score", "contains", TypeTag::Double, 1.5)),
            Err(CompileError::OperatorNotApplicable { .. })
        ));
        let options = CompileOptions::new().explicit_string_conversion(true);
        let f = build_with(Rule::new("score", "begins_with", TypeTag::String, "12"), &options).unwrap();
        assert!(run(&f, &Value::Float(12.5)));
    }

    #[test]
    fn literal_errors_surface_at_build() {
        assert!(matches!(
            build(Rule::new("age", "equal", TypeTag::Integer, "twelve")),
            Err(CompileError::Coercion { .. })
        ));
    }
}
