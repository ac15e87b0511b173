use tracing::{debug, debug_span, trace};

use crate::operators::{LeafInput, OperatorRegistry};
use crate::resolve::resolve;
use crate::types::{CompiledLeaf, CompiledNode};
use crate::{
    Combinator, CompileError, CompileOptions, Entity, FieldType, Predicate, Rule, RuleGroup,
    RuleNode, Schema, SieveError, TypedEntity,
};

/// Compile a rule tree into a predicate over `E`.
///
/// # Errors
///
/// The first [`CompileError`] met in tree order. No partial predicate is built.
///
/// # Example
///
/// ```
/// use rulesieve::{CompileOptions, Entity, FieldType, Schema, TypedEntity, Value, compile, field};
///
/// struct User {
///     age: i64,
/// }
///
/// impl Entity for User {
///     fn field(&self, name: &str) -> Option<Value> {
///         (name == "age").then(|| self.age.into())
///     }
/// }
///
/// impl TypedEntity for User {
///     fn schema() -> Schema {
///         Schema::new("User").field("age", FieldType::Int)
///     }
/// }
///
/// let adult = compile::<User>(&field("age").greater_or_equal(18), &CompileOptions::new()).unwrap();
/// assert!(adult.matches(&User { age: 30 }));
/// assert!(!adult.matches(&User { age: 12 }));
/// ```
pub fn compile<E: TypedEntity>(
    root: &RuleNode,
    options: &CompileOptions,
) -> Result<Predicate<E>, CompileError> {
    compile_with_schema(root, &E::schema(), options)
}

/// Compile against an explicit schema, for entities without a static one.
///
/// # Errors
///
/// The first [`CompileError`] met in tree order.
pub fn compile_with_schema<E: Entity + ?Sized>(
    root: &RuleNode,
    schema: &Schema,
    options: &CompileOptions,
) -> Result<Predicate<E>, CompileError> {
    let span = debug_span!(
        "rulesieve::compile",
        schema = schema.name(),
        locale = %options.locale,
        custom_operators = options.operators.len(),
    );
    let _guard = span.enter();

    let compiler = Compiler {
        schema,
        options,
        registry: OperatorRegistry::for_options(options),
    };
    let node = compiler.node(root, "root")?;
    debug!(leaves = node.leaf_count(), "compiled");
    Ok(Predicate::new(node))
}

/// Parse a JSON rule tree and compile it.
///
/// # Errors
///
/// [`SieveError::Json`] for malformed JSON, [`SieveError::Compile`] for an
/// invalid tree or a compilation failure.
pub fn compile_json<E: TypedEntity>(
    json: &str,
    options: &CompileOptions,
) -> Result<Predicate<E>, SieveError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let root = RuleNode::try_from(value)?;
    Ok(compile(&root, options)?)
}

struct Compiler<'a> {
    schema: &'a Schema,
    options: &'a CompileOptions,
    registry: OperatorRegistry,
}

impl Compiler<'_> {
    fn node(&self, node: &RuleNode, location: &str) -> Result<CompiledNode, CompileError> {
        match node {
            RuleNode::Group(group) => self.group(group, location),
            RuleNode::Leaf(rule) => self.leaf(rule, location).inspect_err(|err| {
                debug!(location, error = %err, "leaf failed to compile");
            }),
        }
    }

    fn group(&self, group: &RuleGroup, location: &str) -> Result<CompiledNode, CompileError> {
        let mut children = Vec::with_capacity(group.children.len());
        for (i, child) in group.children.iter().enumerate() {
            children.push(self.node(child, &format!("{location}.rules[{i}]"))?);
        }
        let folded = if children.is_empty() {
            CompiledNode::Const(group.combinator.identity())
        } else if children.len() == 1 {
            children.remove(0)
        } else {
            match group.combinator {
                Combinator::And => CompiledNode::And(children),
                Combinator::Or => CompiledNode::Or(children),
            }
        };
        Ok(negate_if(folded, group.negated))
    }

    fn leaf(&self, rule: &Rule, location: &str) -> Result<CompiledNode, CompileError> {
        trace!(
            location,
            field = %rule.field,
            operator = %rule.operator,
            type_tag = %rule.type_tag,
            "compiling leaf"
        );
        let accessor = resolve(self.schema, &rule.field)?;
        let definition = self.registry.lookup(&rule.operator)?;
        let fragment = definition.build(&LeafInput::new(rule, &accessor, self.options))?;
        let quantified = matches!(accessor.field_type(), FieldType::List(_) | FieldType::Any);
        let label = Rule {
            negated: false,
            ..rule.clone()
        }
        .to_string();
        let leaf = CompiledNode::Leaf(CompiledLeaf {
            accessor,
            fragment,
            missing_key: self.options.missing_key,
            quantified,
            label,
        });
        Ok(negate_if(leaf, rule.negated))
    }
}

fn negate_if(node: CompiledNode, negated: bool) -> CompiledNode {
    match (node, negated) {
        (node, false) => node,
        (CompiledNode::Const(value), true) => CompiledNode::Const(!value),
        (CompiledNode::Not(inner), true) => *inner,
        (node, true) => CompiledNode::Not(Box::new(node)),
    }
}
