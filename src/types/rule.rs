use std::fmt;
use std::ops::Not;

use serde::{Deserialize, Serialize};
use serde_json::Value as Literal;

use super::type_tag::TypeTag;

/// Boolean combinator of a [`RuleGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// The neutral element: `true` for AND, `false` for OR.
    #[must_use]
    pub fn identity(self) -> bool {
        matches!(self, Combinator::And)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }
}

impl fmt::Display for Combinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A node of a rule tree: either a group of child nodes or a single rule.
///
/// Trees are plain data. Nothing is validated until compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value", into = "serde_json::Value")]
pub enum RuleNode {
    Group(RuleGroup),
    Leaf(Rule),
}

/// A boolean combination of child nodes, optionally negated.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleGroup {
    pub combinator: Combinator,
    pub negated: bool,
    pub children: Vec<RuleNode>,
}

/// A single field / operator / value comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    /// Dot-separated field path.
    pub field: String,
    /// Client-side identifier, carried through untouched.
    pub id: Option<String>,
    pub operator: String,
    pub type_tag: TypeTag,
    /// A literal, an array of literals, or `null` for operators without operands.
    pub value: Literal,
    pub negated: bool,
}

impl Rule {
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        operator: impl Into<String>,
        type_tag: TypeTag,
        value: impl Into<Literal>,
    ) -> Self {
        Self {
            field: field.into(),
            id: None,
            operator: operator.into(),
            type_tag,
            value: value.into(),
            negated: false,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The literals of this rule: array elements, a single literal, or none for `null`.
    #[must_use]
    pub fn literals(&self) -> Vec<&Literal> {
        match &self.value {
            Literal::Null => Vec::new(),
            Literal::Array(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

impl RuleGroup {
    #[must_use]
    pub fn new(combinator: Combinator, children: Vec<RuleNode>) -> Self {
        Self {
            combinator,
            negated: false,
            children,
        }
    }

    #[must_use]
    pub fn and(children: impl IntoIterator<Item = RuleNode>) -> Self {
        Self::new(Combinator::And, children.into_iter().collect())
    }

    #[must_use]
    pub fn or(children: impl IntoIterator<Item = RuleNode>) -> Self {
        Self::new(Combinator::Or, children.into_iter().collect())
    }
}

impl RuleNode {
    /// Combine with another node under AND, flattening into an existing
    /// non-negated AND group.
    #[must_use]
    pub fn and(self, other: RuleNode) -> RuleNode {
        self.combine(Combinator::And, other)
    }

    /// Combine with another node under OR, flattening into an existing
    /// non-negated OR group.
    #[must_use]
    pub fn or(self, other: RuleNode) -> RuleNode {
        self.combine(Combinator::Or, other)
    }

    fn combine(self, combinator: Combinator, other: RuleNode) -> RuleNode {
        match self {
            RuleNode::Group(mut group) if group.combinator == combinator && !group.negated => {
                group.children.push(other);
                RuleNode::Group(group)
            }
            node => RuleNode::Group(RuleGroup::new(combinator, vec![node, other])),
        }
    }

    /// Toggle this node's negation flag.
    #[must_use]
    pub fn negate(self) -> RuleNode {
        match self {
            RuleNode::Group(mut group) => {
                group.negated = !group.negated;
                RuleNode::Group(group)
            }
            RuleNode::Leaf(mut rule) => {
                rule.negated = !rule.negated;
                RuleNode::Leaf(rule)
            }
        }
    }

    #[must_use]
    pub fn is_negated(&self) -> bool {
        match self {
            RuleNode::Group(group) => group.negated,
            RuleNode::Leaf(rule) => rule.negated,
        }
    }

    /// Distinct field paths referenced by this tree, in first-appearance order.
    #[must_use]
    pub fn fields(&self) -> Vec<&str> {
        let mut fields = Vec::new();
        collect_fields(self, &mut fields);
        fields
    }

    /// Number of leaf rules in this tree.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            RuleNode::Group(group) => group.children.iter().map(RuleNode::leaf_count).sum(),
            RuleNode::Leaf(_) => 1,
        }
    }
}

fn collect_fields<'a>(node: &'a RuleNode, out: &mut Vec<&'a str>) {
    match node {
        RuleNode::Group(group) => {
            for child in &group.children {
                collect_fields(child, out);
            }
        }
        RuleNode::Leaf(rule) => {
            if !out.contains(&rule.field.as_str()) {
                out.push(&rule.field);
            }
        }
    }
}

impl From<Rule> for RuleNode {
    fn from(rule: Rule) -> Self {
        RuleNode::Leaf(rule)
    }
}

impl From<RuleGroup> for RuleNode {
    fn from(group: RuleGroup) -> Self {
        RuleNode::Group(group)
    }
}

impl Not for RuleNode {
    type Output = RuleNode;

    fn not(self) -> RuleNode {
        self.negate()
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT ")?;
        }
        write!(f, "({} {}", self.field, self.operator)?;
        if !self.value.is_null() {
            write!(f, " {}", self.value)?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for RuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negated {
            write!(f, "NOT ")?;
        }
        if self.children.is_empty() {
            return write!(f, "({})", self.combinator);
        }
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.combinator)?;
            }
            write!(f, "{child}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for RuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleNode::Group(group) => write!(f, "{group}"),
            RuleNode::Leaf(rule) => write!(f, "{rule}"),
        }
    }
}

/// Intermediate builder for leaf rules. Created by [`field()`].
///
/// The declared type is inferred from the literal (strings, integers,
/// doubles, booleans) unless set with [`typed`](Self::typed).
#[derive(Debug, Clone)]
pub struct FieldExpr {
    path: String,
    type_tag: Option<TypeTag>,
}

impl FieldExpr {
    /// Declare the literal's type explicitly.
    #[must_use]
    pub fn typed(mut self, type_tag: TypeTag) -> Self {
        self.type_tag = Some(type_tag);
        self
    }

    /// A leaf with an arbitrary (built-in or custom) operator.
    #[must_use]
    pub fn op(self, operator: &str, value: impl Into<Literal>) -> RuleNode {
        let value = value.into();
        let type_tag = self.type_tag.unwrap_or_else(|| infer_tag(&value));
        RuleNode::Leaf(Rule::new(self.path, operator, type_tag, value))
    }

    #[must_use]
    pub fn equal(self, value: impl Into<Literal>) -> RuleNode {
        self.op("equal", value)
    }

    #[must_use]
    pub fn not_equal(self, value: impl Into<Literal>) -> RuleNode {
        self.op("not_equal", value)
    }

    #[must_use]
    pub fn less(self, value: impl Into<Literal>) -> RuleNode {
        self.op("less", value)
    }

    #[must_use]
    pub fn less_or_equal(self, value: impl Into<Literal>) -> RuleNode {
        self.op("less_or_equal", value)
    }

    #[must_use]
    pub fn greater(self, value: impl Into<Literal>) -> RuleNode {
        self.op("greater", value)
    }

    #[must_use]
    pub fn greater_or_equal(self, value: impl Into<Literal>) -> RuleNode {
        self.op("greater_or_equal", value)
    }

    #[must_use]
    pub fn between(self, lower: impl Into<Literal>, upper: impl Into<Literal>) -> RuleNode {
        self.op("between", Literal::Array(vec![lower.into(), upper.into()]))
    }

    #[must_use]
    pub fn not_between(self, lower: impl Into<Literal>, upper: impl Into<Literal>) -> RuleNode {
        self.op("not_between", Literal::Array(vec![lower.into(), upper.into()]))
    }

    #[must_use]
    pub fn is_in<T: Into<Literal>>(self, values: impl IntoIterator<Item = T>) -> RuleNode {
        self.op("in", list(values))
    }

    #[must_use]
    pub fn not_in<T: Into<Literal>>(self, values: impl IntoIterator<Item = T>) -> RuleNode {
        self.op("not_in", list(values))
    }

    #[must_use]
    pub fn is_null(self) -> RuleNode {
        self.op("is_null", Literal::Null)
    }

    #[must_use]
    pub fn is_not_null(self) -> RuleNode {
        self.op("is_not_null", Literal::Null)
    }

    #[must_use]
    pub fn is_empty(self) -> RuleNode {
        self.op("is_empty", Literal::Null)
    }

    #[must_use]
    pub fn is_not_empty(self) -> RuleNode {
        self.op("is_not_empty", Literal::Null)
    }

    #[must_use]
    pub fn contains(self, value: impl Into<Literal>) -> RuleNode {
        self.op("contains", value)
    }

    #[must_use]
    pub fn not_contains(self, value: impl Into<Literal>) -> RuleNode {
        self.op("not_contains", value)
    }

    #[must_use]
    pub fn begins_with(self, value: impl Into<Literal>) -> RuleNode {
        self.op("begins_with", value)
    }

    #[must_use]
    pub fn not_begins_with(self, value: impl Into<Literal>) -> RuleNode {
        self.op("not_begins_with", value)
    }

    #[must_use]
    pub fn ends_with(self, value: impl Into<Literal>) -> RuleNode {
        self.op("ends_with", value)
    }

    #[must_use]
    pub fn not_ends_with(self, value: impl Into<Literal>) -> RuleNode {
        self.op("not_ends_with", value)
    }
}

fn list<T: Into<Literal>>(values: impl IntoIterator<Item = T>) -> Literal {
    Literal::Array(values.into_iter().map(Into::into).collect())
}

fn infer_tag(value: &Literal) -> TypeTag {
    let sample = match value {
        Literal::Array(items) => items.iter().find(|v| !v.is_null()),
        other => Some(other),
    };
    match sample {
        Some(Literal::String(_)) => TypeTag::String,
        Some(Literal::Bool(_)) => TypeTag::Boolean,
        Some(Literal::Number(n)) if n.is_i64() || n.is_u64() => TypeTag::Integer,
        Some(Literal::Number(_)) => TypeTag::Double,
        _ => TypeTag::NA,
    }
}

/// Start building a leaf rule on a field path.
#[must_use]
pub fn field(path: &str) -> FieldExpr {
    FieldExpr {
        path: path.to_owned(),
        type_tag: None,
    }
}

/// An AND group over the given nodes.
#[must_use]
pub fn all(children: impl IntoIterator<Item = RuleNode>) -> RuleNode {
    RuleNode::Group(RuleGroup::and(children))
}

/// An OR group over the given nodes.
#[must_use]
pub fn any(children: impl IntoIterator<Item = RuleNode>) -> RuleNode {
    RuleNode::Group(RuleGroup::or(children))
}
