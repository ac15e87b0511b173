//! The JSON wire shape of rule trees.
//!
//! ```json
//! { "condition": "AND", "not": false, "rules": [
//!     { "id": "age", "field": "age", "type": "integer", "operator": "greater", "value": 18 }
//! ] }
//! ```
//!
//! A node with a `rules` key is a group, a node with a `field` key is a leaf.
//! Keys are matched exactly first, then case-insensitively. `condition`
//! defaults to AND and `type` to string.

use serde_json::{Map, Value as Json};

use crate::{Combinator, CompileError, Rule, RuleGroup, RuleNode, TypeTag};

impl TryFrom<Json> for RuleNode {
    type Error = CompileError;

    fn try_from(json: Json) -> Result<Self, Self::Error> {
        node(json, "root")
    }
}

impl From<RuleNode> for Json {
    fn from(node: RuleNode) -> Self {
        let mut object = Map::new();
        match node {
            RuleNode::Group(group) => {
                object.insert("condition".into(), group.combinator.as_str().into());
                if group.negated {
                    object.insert("not".into(), true.into());
                }
                let rules = group.children.into_iter().map(Json::from).collect();
                object.insert("rules".into(), Json::Array(rules));
            }
            RuleNode::Leaf(rule) => {
                if let Some(id) = rule.id {
                    object.insert("id".into(), id.into());
                }
                object.insert("field".into(), rule.field.into());
                object.insert("type".into(), rule.type_tag.as_str().into());
                object.insert("operator".into(), rule.operator.into());
                object.insert("value".into(), rule.value);
                if rule.negated {
                    object.insert("not".into(), true.into());
                }
            }
        }
        Json::Object(object)
    }
}

fn node(json: Json, location: &str) -> Result<RuleNode, CompileError> {
    let mut object = match json {
        Json::Object(object) => object,
        other => {
            return Err(invalid(
                location,
                format!("expected an object, found {}", kind(&other)),
            ));
        }
    };
    if let Some(rules) = take(&mut object, "rules") {
        return group(object, rules, location).map(RuleNode::Group);
    }
    if let Some(field) = take(&mut object, "field") {
        return leaf(object, field, location).map(RuleNode::Leaf);
    }
    Err(invalid(location, "expected a 'rules' or 'field' key".to_owned()))
}

fn group(
    mut object: Map<String, Json>,
    rules: Json,
    location: &str,
) -> Result<RuleGroup, CompileError> {
    let combinator = match take(&mut object, "condition") {
        None | Some(Json::Null) => Combinator::And,
        Some(Json::String(s)) if s.eq_ignore_ascii_case("and") => Combinator::And,
        Some(Json::String(s)) if s.eq_ignore_ascii_case("or") => Combinator::Or,
        Some(other) => return Err(invalid(location, format!("unknown condition {other}"))),
    };
    let negated = flag(&mut object, location)?;
    let items = match rules {
        Json::Array(items) => items,
        other => {
            return Err(invalid(
                location,
                format!("'rules' must be an array, found {}", kind(&other)),
            ));
        }
    };
    let children = items
        .into_iter()
        .enumerate()
        .map(|(i, item)| node(item, &format!("{location}.rules[{i}]")))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(RuleGroup {
        combinator,
        negated,
        children,
    })
}

fn leaf(mut object: Map<String, Json>, field: Json, location: &str) -> Result<Rule, CompileError> {
    let field = required_string(Some(field), "field", location)?;
    let operator = required_string(take(&mut object, "operator"), "operator", location)?;
    let type_tag = match take(&mut object, "type") {
        None | Some(Json::Null) => TypeTag::String,
        Some(Json::String(s)) => s
            .parse::<TypeTag>()
            .map_err(|err| invalid(location, err.to_string()))?,
        Some(other) => {
            return Err(invalid(
                location,
                format!("'type' must be a string, found {}", kind(&other)),
            ));
        }
    };
    let id = match take(&mut object, "id") {
        None | Some(Json::Null) => None,
        Some(Json::String(s)) => Some(s),
        Some(other) => {
            return Err(invalid(
                location,
                format!("'id' must be a string, found {}", kind(&other)),
            ));
        }
    };
    let value = take(&mut object, "value").unwrap_or(Json::Null);
    let negated = flag(&mut object, location)?;
    Ok(Rule {
        field,
        id,
        operator,
        type_tag,
        value,
        negated,
    })
}

fn required_string(json: Option<Json>, key: &str, location: &str) -> Result<String, CompileError> {
    match json {
        Some(Json::String(s)) if !s.trim().is_empty() => Ok(s),
        Some(Json::String(_)) => Err(invalid(location, format!("'{key}' must not be empty"))),
        Some(other) => Err(invalid(
            location,
            format!("'{key}' must be a string, found {}", kind(&other)),
        )),
        None => Err(invalid(location, format!("missing '{key}'"))),
    }
}

fn flag(object: &mut Map<String, Json>, location: &str) -> Result<bool, CompileError> {
    match take(object, "not") {
        None | Some(Json::Null) => Ok(false),
        Some(Json::Bool(b)) => Ok(b),
        Some(other) => Err(invalid(
            location,
            format!("'not' must be a boolean, found {}", kind(&other)),
        )),
    }
}

fn kind(json: &Json) -> &'static str {
    match json {
        Json::Null => "null",
        Json::Bool(_) => "a boolean",
        Json::Number(_) => "a number",
        Json::String(_) => "a string",
        Json::Array(_) => "an array",
        Json::Object(_) => "an object",
    }
}

fn take(object: &mut Map<String, Json>, key: &str) -> Option<Json> {
    if let Some(value) = object.remove(key) {
        return Some(value);
    }
    let found = object.keys().find(|k| k.eq_ignore_ascii_case(key))?.clone();
    object.remove(&found)
}

fn invalid(location: &str, reason: String) -> CompileError {
    CompileError::InvalidRuleStructure {
        location: location.to_owned(),
        reason,
    }
}
