use serde::Deserialize;

use crate::coerce::Locale;
use crate::operators::OperatorDefinition;

/// What happens when a dictionary field lacks the requested key at evaluation time.
///
/// Operators that define null-absent semantics (`is_null`, the `not_*`
/// family, and the emptiness tests) always see a missing key as null; this
/// policy applies to the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingKeyPolicy {
    /// Evaluation fails with [`EvaluationError::DictionaryKeyMissing`](crate::EvaluationError).
    #[default]
    Error,
    /// The missing value is treated as null.
    Null,
}

/// Configuration for one compilation.
///
/// # Example
///
/// ```
/// use rulesieve::{CompileOptions, Locale, MissingKeyPolicy};
///
/// let options = CompileOptions::new()
///     .locale(Locale::from_tag("de-DE").unwrap())
///     .case_sensitive(true)
///     .missing_key(MissingKeyPolicy::Null);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompileOptions {
    pub(crate) locale: Locale,
    #[serde(rename = "case_sensitive_strings")]
    pub(crate) case_sensitive: bool,
    #[serde(rename = "parse_dates_as_utc")]
    pub(crate) dates_as_utc: bool,
    #[serde(rename = "require_explicit_string_conversion")]
    pub(crate) explicit_string_conversion: bool,
    pub(crate) missing_key: MissingKeyPolicy,
    #[serde(skip)]
    pub(crate) operators: Vec<OperatorDefinition>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            locale: Locale::invariant(),
            case_sensitive: false,
            dates_as_utc: true,
            explicit_string_conversion: false,
            missing_key: MissingKeyPolicy::Error,
            operators: Vec::new(),
        }
    }
}

impl CompileOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the data-only options from JSON, e.g.
    /// `{"locale": "fr-FR", "case_sensitive_strings": true}`.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    #[must_use]
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    /// Normalize offset-bearing date literals to UTC rather than the local clock.
    #[must_use]
    pub fn parse_dates_as_utc(mut self, as_utc: bool) -> Self {
        self.dates_as_utc = as_utc;
        self
    }

    /// Stringify non-string fields before string comparisons instead of
    /// re-reading the literal as the field's own type.
    #[must_use]
    pub fn explicit_string_conversion(mut self, enabled: bool) -> Self {
        self.explicit_string_conversion = enabled;
        self
    }

    #[must_use]
    pub fn missing_key(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_key = policy;
        self
    }

    /// Register a custom operator. It replaces any built-in or earlier
    /// custom operator of the same name for compilations using these options.
    #[must_use]
    pub fn operator(mut self, definition: OperatorDefinition) -> Self {
        self.operators.retain(|d| d.name() != definition.name());
        self.operators.push(definition);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.locale.tag(), "invariant");
        assert!(!options.case_sensitive);
        assert!(options.dates_as_utc);
        assert!(!options.explicit_string_conversion);
        assert_eq!(options.missing_key, MissingKeyPolicy::Error);
        assert!(options.operators.is_empty());
    }

    #[test]
    fn from_json_partial() {
        let options = CompileOptions::from_json(
            r#"{"locale": "de-DE", "case_sensitive_strings": true, "missing_key": "null"}"#,
        )
        .unwrap();
        assert_eq!(options.locale.decimal_separator(), ',');
        assert!(options.case_sensitive);
        assert!(options.dates_as_utc);
        assert_eq!(options.missing_key, MissingKeyPolicy::Null);
    }

    #[test]
    fn from_json_rejects_unknown_locale_and_keys() {
        assert!(CompileOptions::from_json(r#"{"locale": "xx-XX"}"#).is_err());
        assert!(CompileOptions::from_json(r#"{"colation": "x"}"#).is_err());
    }

    #[test]
    fn later_operator_replaces_earlier() {
        let options = CompileOptions::new()
            .operator(OperatorDefinition::whole("always", |_| true))
            .operator(OperatorDefinition::whole("always", |_| false));
        assert_eq!(options.operators.len(), 1);
    }
}
