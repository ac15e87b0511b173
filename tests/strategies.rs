use std::collections::BTreeMap;

use proptest::prelude::*;
use rulesieve::{Combinator, FieldType, Record, RuleGroup, RuleNode, Schema, Value, field};

// --- Fixed entity schema ---
// age    : int (0..=120)
// status : string, one of {"active", "inactive", "suspended"}
// banned : bool
// score  : float (0.0..100.0)
// tags   : list of string, subset of {"vip", "beta", "staff"}
// attrs  : map of string, may carry "tier"

const STATUSES: &[&str] = &["active", "inactive", "suspended"];
const TAGS: &[&str] = &["vip", "beta", "staff"];
const TIERS: &[&str] = &["gold", "silver"];

pub fn schema() -> Schema {
    Schema::new("Account")
        .field("age", FieldType::Int)
        .field("status", FieldType::String)
        .field("banned", FieldType::Bool)
        .field("score", FieldType::Float)
        .field("tags", FieldType::list(FieldType::String))
        .field("attrs", FieldType::map(FieldType::String))
}

/// Generate a record that aligns with the fixed schema.
pub fn arb_record() -> impl Strategy<Value = Record> {
    (
        0_i64..=120,
        prop::sample::select(STATUSES),
        any::<bool>(),
        0.0_f64..100.0,
        prop::sample::subsequence(TAGS, 0..=TAGS.len()),
        prop::option::of(prop::sample::select(TIERS)),
    )
        .prop_map(|(age, status, banned, score, tags, tier)| {
            let mut attrs = BTreeMap::new();
            if let Some(tier) = tier {
                attrs.insert("tier".to_owned(), Value::from(tier));
            }
            Record::new()
                .set("age", age)
                .set("status", status)
                .set("banned", banned)
                .set("score", score)
                .set("tags", tags)
                .set("attrs", Value::Map(attrs))
        })
}

/// Generate a well-formed leaf on a random field of the schema.
pub fn arb_leaf() -> impl Strategy<Value = RuleNode> {
    prop_oneof![
        (0_i64..=120, prop::sample::select(&[0u8, 1, 2, 3, 4, 5][..])).prop_map(|(val, op)| {
            let f = field("age");
            match op {
                0 => f.equal(val),
                1 => f.not_equal(val),
                2 => f.greater(val),
                3 => f.greater_or_equal(val),
                4 => f.less(val),
                _ => f.less_or_equal(val),
            }
        }),
        (0_i64..=120, 0_i64..=120, any::<bool>()).prop_map(|(a, b, negate)| {
            let (lo, hi) = (a.min(b), a.max(b));
            if negate {
                field("age").not_between(lo, hi)
            } else {
                field("age").between(lo, hi)
            }
        }),
        (prop::sample::select(STATUSES), prop::sample::select(&[0u8, 1, 2, 3][..])).prop_map(
            |(val, op)| {
                let f = field("status");
                match op {
                    0 => f.equal(val),
                    1 => f.not_equal(val),
                    2 => f.begins_with(&val[..2]),
                    _ => f.is_in([val, "active"]),
                }
            }
        ),
        any::<bool>().prop_map(|val| field("banned").equal(val)),
        (0.0_f64..100.0).prop_map(|val| field("score").greater(val)),
        (prop::sample::select(TAGS), any::<bool>()).prop_map(|(val, positive)| {
            if positive {
                field("tags").contains(val)
            } else {
                field("tags").not_contains(val)
            }
        }),
        (prop::sample::select(TIERS), any::<bool>()).prop_map(|(val, positive)| {
            if positive {
                field("attrs.tier").equal(val)
            } else {
                field("attrs.tier").not_equal(val)
            }
        }),
        Just(field("attrs.tier").is_null()),
        Just(field("tags").is_empty()),
    ]
}

/// Generate a rule tree of nested, possibly negated and possibly empty groups.
pub fn arb_tree() -> impl Strategy<Value = RuleNode> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        (
            prop::collection::vec(inner, 0..4),
            any::<bool>(),
            any::<bool>(),
        )
            .prop_map(|(children, or, negated)| {
                RuleNode::Group(RuleGroup {
                    combinator: if or { Combinator::Or } else { Combinator::And },
                    negated,
                    children,
                })
            })
    })
}
