//! Named operators and the per-compilation registry.
//!
//! An operator is a builder: given one leaf (its rule, resolved field and the
//! compile options) it coerces the leaf's literals and returns a
//! [`Fragment`], the runtime test the compiled predicate runs. Built-ins and
//! caller-supplied operators go through the same interface.

mod builtin;

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value as Literal;

use crate::coerce::{self, Locale};
use crate::resolve::FieldAccessor;
use crate::{CoercionError, CompileError, CompileOptions, Rule, TypeTag, Value};

/// A runtime test over one value.
pub type Test = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// How an element test applies to a collection-valued field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    /// At least one element satisfies the test.
    Any,
    /// Every element satisfies the test (true for an empty collection).
    All,
}

/// How a fragment sees a dictionary key that is absent at evaluation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingKey {
    /// The absent value is null.
    AsNull,
    /// Defer to [`MissingKeyPolicy`](crate::MissingKeyPolicy).
    Policy,
}

/// The compiled form of one leaf's operator.
#[derive(Clone)]
pub enum Fragment {
    /// Tested against each element when the field is a collection, against
    /// the value itself otherwise.
    Element {
        test: Test,
        quantifier: Quantifier,
        on_missing: MissingKey,
    },
    /// Tested against the whole field value, collection or not.
    Whole { test: Test, on_missing: MissingKey },
}

impl Fragment {
    /// An element test satisfied by any element of a collection.
    pub fn any(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Fragment::Element {
            test: Arc::new(test),
            quantifier: Quantifier::Any,
            on_missing: MissingKey::Policy,
        }
    }

    /// An element test every element of a collection must satisfy.
    pub fn all(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Fragment::Element {
            test: Arc::new(test),
            quantifier: Quantifier::All,
            on_missing: MissingKey::Policy,
        }
    }

    /// A test over the whole value, ignoring quantification.
    pub fn whole(test: impl Fn(&Value) -> bool + Send + Sync + 'static) -> Self {
        Fragment::Whole {
            test: Arc::new(test),
            on_missing: MissingKey::Policy,
        }
    }

    /// Treat a missing dictionary key as null instead of applying the policy.
    #[must_use]
    pub fn null_absent(self) -> Self {
        match self {
            Fragment::Element {
                test, quantifier, ..
            } => Fragment::Element {
                test,
                quantifier,
                on_missing: MissingKey::AsNull,
            },
            Fragment::Whole { test, .. } => Fragment::Whole {
                test,
                on_missing: MissingKey::AsNull,
            },
        }
    }

    #[must_use]
    pub fn on_missing(&self) -> MissingKey {
        match self {
            Fragment::Element { on_missing, .. } | Fragment::Whole { on_missing, .. } => *on_missing,
        }
    }
}

impl fmt::Debug for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fragment::Element {
                quantifier,
                on_missing,
                ..
            } => f
                .debug_struct("Element")
                .field("quantifier", quantifier)
                .field("on_missing", on_missing)
                .finish_non_exhaustive(),
            Fragment::Whole { on_missing, .. } => f
                .debug_struct("Whole")
                .field("on_missing", on_missing)
                .finish_non_exhaustive(),
        }
    }
}

type BuildFn = dyn Fn(&LeafInput<'_>) -> Result<Fragment, CompileError> + Send + Sync;

/// A named operator builder.
///
/// # Example
///
/// ```
/// use rulesieve::{Fragment, OperatorDefinition, Value};
///
/// let even = OperatorDefinition::new("is_even", |_leaf| {
///     Ok(Fragment::any(|v| matches!(v, Value::Int(i) if i % 2 == 0)))
/// });
/// assert_eq!(even.name(), "is_even");
/// ```
#[derive(Clone)]
pub struct OperatorDefinition {
    name: String,
    build: Arc<BuildFn>,
}

impl OperatorDefinition {
    pub fn new(
        name: impl Into<String>,
        build: impl Fn(&LeafInput<'_>) -> Result<Fragment, CompileError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            build: Arc::new(build),
        }
    }

    /// An operator without operands that tests each element of the field.
    pub fn element(
        name: impl Into<String>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        let test: Test = Arc::new(test);
        Self::new(name, move |_| {
            let test = Arc::clone(&test);
            Ok(Fragment::any(move |v| test(v)))
        })
    }

    /// An operator without operands that tests the whole field value.
    pub fn whole(
        name: impl Into<String>,
        test: impl Fn(&Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        let test: Test = Arc::new(test);
        Self::new(name, move |_| {
            let test = Arc::clone(&test);
            Ok(Fragment::whole(move |v| test(v)))
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn build(&self, input: &LeafInput<'_>) -> Result<Fragment, CompileError> {
        (self.build)(input)
    }
}

impl fmt::Debug for OperatorDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperatorDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Maps operator names to definitions for one compilation.
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    operators: BTreeMap<String, OperatorDefinition>,
}

impl OperatorRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in operator set.
    #[must_use]
    pub fn builtin() -> Self {
        builtin::definitions()
            .into_iter()
            .fold(Self::new(), OperatorRegistry::with)
    }

    /// Built-ins plus the custom operators registered on `options`.
    #[must_use]
    pub fn for_options(options: &CompileOptions) -> Self {
        let mut registry = Self::builtin();
        for definition in &options.operators {
            if registry.operators.contains_key(definition.name()) {
                tracing::debug!(operator = definition.name(), "custom operator overrides built-in");
            }
            registry = registry.with(definition.clone());
        }
        registry
    }

    /// Add a definition, replacing any existing one of the same name.
    #[must_use]
    pub fn with(mut self, definition: OperatorDefinition) -> Self {
        self.operators.insert(definition.name.clone(), definition);
        self
    }

    /// # Errors
    ///
    /// [`CompileError::UnknownOperator`] when no operator has this name.
    pub fn lookup(&self, name: &str) -> Result<&OperatorDefinition, CompileError> {
        self.operators
            .get(name)
            .ok_or_else(|| CompileError::UnknownOperator {
                operator: name.to_owned(),
            })
    }

    /// Registered names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.operators.keys().map(String::as_str).collect()
    }
}

/// How the field's values are compared with coerced literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Plan {
    /// Tag the literals are coerced to.
    tag: TypeTag,
    /// Field values are rendered as text before comparison.
    stringify: bool,
}

/// Everything an operator builder sees about one leaf.
pub struct LeafInput<'a> {
    rule: &'a Rule,
    field: &'a FieldAccessor,
    options: &'a CompileOptions,
    plan: Option<Plan>,
}

impl<'a> LeafInput<'a> {
    pub(crate) fn new(rule: &'a Rule, field: &'a FieldAccessor, options: &'a CompileOptions) -> Self {
        let plan = plan(rule, field, options);
        Self {
            rule,
            field,
            options,
            plan,
        }
    }

    #[must_use]
    pub fn rule(&self) -> &Rule {
        self.rule
    }

    #[must_use]
    pub fn field(&self) -> &FieldAccessor {
        self.field
    }

    #[must_use]
    pub fn options(&self) -> &CompileOptions {
        self.options
    }

    /// The type tag declared on the rule.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.rule.type_tag
    }

    #[must_use]
    pub fn locale(&self) -> &Locale {
        &self.options.locale
    }

    /// The raw literals: array elements, a single literal, or none for `null`.
    #[must_use]
    pub fn literals(&self) -> Vec<&'a Literal> {
        self.rule.literals()
    }

    /// Coerce one literal to the leaf's effective type.
    ///
    /// # Errors
    ///
    /// [`CompileError::TypeMismatch`] when the declared type cannot be compared
    /// with the field, [`CompileError::Coercion`] when the literal does not parse.
    pub fn coerce(&self, literal: &Literal) -> Result<Value, CompileError> {
        let plan = self.plan()?;
        coerce::coerce(
            literal,
            plan.tag,
            &self.options.locale,
            self.options.dates_as_utc,
        )
        .map_err(|source| self.coercion_error(source))
    }

    /// Exactly one operand. A `null` value is the null operand.
    pub fn single(&self) -> Result<Value, CompileError> {
        match &self.rule.value {
            Literal::Array(items) if items.len() == 1 => self.coerce(&items[0]),
            Literal::Array(items) => Err(self.arity(1, items.len())),
            literal => self.coerce(literal),
        }
    }

    /// Exactly two operands, as a two-element array.
    pub fn pair(&self) -> Result<(Value, Value), CompileError> {
        match &self.rule.value {
            Literal::Array(items) if items.len() == 2 => {
                Ok((self.coerce(&items[0])?, self.coerce(&items[1])?))
            }
            _ => Err(self.arity(2, self.rule.literals().len())),
        }
    }

    /// Any number of operands. A scalar is a one-element list, `null` an empty one.
    pub fn list(&self) -> Result<Vec<Value>, CompileError> {
        self.rule
            .literals()
            .into_iter()
            .map(|literal| self.coerce(literal))
            .collect()
    }

    /// Comparison settings for operators that compare values.
    pub fn view(&self) -> Result<ValueView, CompileError> {
        let plan = self.plan()?;
        Ok(self.view_for(plan))
    }

    /// Like [`view`](Self::view), for ordering operators. Booleans and
    /// identifiers have no order.
    pub fn ordered_view(&self) -> Result<ValueView, CompileError> {
        let plan = self.plan()?;
        if !plan.tag.is_ordered() {
            return Err(self.not_applicable());
        }
        Ok(self.view_for(plan))
    }

    /// Like [`view`](Self::view), for text operators. Requires a string
    /// field, an untyped leaf, or explicit string conversion.
    pub fn text_view(&self) -> Result<ValueView, CompileError> {
        let plan = self.plan()?;
        if !(plan.stringify || plan.tag == TypeTag::String || self.rule.type_tag == TypeTag::NA) {
            return Err(self.not_applicable());
        }
        Ok(self.view_for(plan))
    }

    fn plan(&self) -> Result<Plan, CompileError> {
        self.plan.ok_or_else(|| CompileError::TypeMismatch {
            field: self.rule.field.clone(),
            declared: self.rule.type_tag,
            field_type: self.field.field_type().element().to_string(),
        })
    }

    fn view_for(&self, plan: Plan) -> ValueView {
        ValueView {
            stringify: plan.stringify,
            case_sensitive: self.options.case_sensitive,
            locale: self.options.locale.clone(),
        }
    }

    fn coercion_error(&self, source: CoercionError) -> CompileError {
        CompileError::Coercion {
            field: self.rule.field.clone(),
            source,
        }
    }

    fn arity(&self, expected: usize, actual: usize) -> CompileError {
        self.coercion_error(CoercionError::Arity {
            operator: self.rule.operator.clone(),
            expected,
            actual,
        })
    }

    fn not_applicable(&self) -> CompileError {
        CompileError::OperatorNotApplicable {
            operator: self.rule.operator.clone(),
            field: self.rule.field.clone(),
            field_type: self.field.field_type().to_string(),
        }
    }
}

/// `None` when the declared type cannot be compared with the field.
fn plan(rule: &Rule, field: &FieldAccessor, options: &CompileOptions) -> Option<Plan> {
    let declared = rule.type_tag;
    let element = field.field_type().element();
    let native = Plan {
        tag: declared,
        stringify: false,
    };
    if declared == TypeTag::NA {
        // Untyped leaves on a typed field take the field's own type.
        return Some(TypeTag::natural(element).map_or(native, |natural| Plan {
            tag: natural,
            stringify: false,
        }));
    }
    if declared.compatible_with(element) {
        return Some(native);
    }
    if declared == TypeTag::String
        && let Some(natural) = TypeTag::natural(element)
    {
        return Some(if options.explicit_string_conversion {
            Plan {
                tag: TypeTag::String,
                stringify: true,
            }
        } else {
            Plan {
                tag: natural,
                stringify: false,
            }
        });
    }
    None
}

/// Comparison settings captured by a leaf's runtime test.
#[derive(Debug, Clone)]
pub struct ValueView {
    stringify: bool,
    case_sensitive: bool,
    locale: Locale,
}

impl ValueView {
    /// The field value as it takes part in comparisons.
    #[must_use]
    pub fn prepare<'v>(&self, value: &'v Value) -> Cow<'v, Value> {
        if self.stringify
            && !matches!(value, Value::String(_))
            && let Some(text) = coerce::stringify(value, &self.locale)
        {
            return Cow::Owned(Value::String(text));
        }
        Cow::Borrowed(value)
    }

    /// Three-way comparison; `None` when either side is null or the types differ.
    #[must_use]
    pub fn compare(&self, value: &Value, target: &Value) -> Option<Ordering> {
        self.prepare(value).compare(target, self.case_sensitive)
    }

    #[must_use]
    pub fn equals(&self, value: &Value, target: &Value) -> bool {
        self.compare(value, target) == Some(Ordering::Equal)
    }

    /// The value as text for substring tests, case-folded unless case-sensitive.
    #[must_use]
    pub fn text(&self, value: &Value) -> Option<String> {
        let text = if self.stringify {
            coerce::stringify(value, &self.locale)?
        } else {
            value.as_str()?.to_owned()
        };
        Some(if self.case_sensitive {
            text
        } else {
            text.to_lowercase()
        })
    }
}
