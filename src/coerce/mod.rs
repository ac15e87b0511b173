//! Turning rule literals into typed [`Value`]s.
//!
//! Literals arrive as JSON. Numbers and booleans are taken as-is; strings are
//! parsed with the active [`Locale`]. `null` coerces to [`Value::Null`] for
//! every type tag.

mod date;
mod locale;
mod number;

use serde_json::Value as Literal;
use uuid::Uuid;

pub use locale::{DateOrder, Locale, LocaleError};

use crate::{CoercionError, TypeTag, Value};

pub(crate) use date::{Moment, parse_moment};
pub(crate) use number::{Number, format_float, parse_number};

/// Coerce one literal to the value type implied by `tag`.
///
/// # Errors
///
/// Returns [`CoercionError::Invalid`] when a string literal does not parse as
/// `tag` under `locale`, and [`CoercionError::UnsupportedLiteral`] when the
/// literal's JSON kind can never represent `tag` (an object as an integer).
pub fn coerce(
    literal: &Literal,
    tag: TypeTag,
    locale: &Locale,
    dates_as_utc: bool,
) -> Result<Value, CoercionError> {
    if literal.is_null() {
        return Ok(Value::Null);
    }
    match tag {
        TypeTag::NA => Ok(from_json(literal)),
        TypeTag::String => match literal {
            Literal::String(s) => Ok(Value::String(s.clone())),
            Literal::Number(n) => Ok(Value::String(n.to_string())),
            Literal::Bool(b) => Ok(Value::String(b.to_string())),
            _ => Err(unsupported(literal, tag)),
        },
        TypeTag::Integer => match literal {
            Literal::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().and_then(integral))
                .map(Value::Int)
                .ok_or_else(|| invalid(literal, tag)),
            Literal::String(s) => match parse_number(s, locale) {
                Some(Number::Int(i)) => Ok(Value::Int(i)),
                Some(Number::Float(f)) => integral(f).map(Value::Int).ok_or_else(|| invalid(literal, tag)),
                None => Err(invalid(literal, tag)),
            },
            _ => Err(unsupported(literal, tag)),
        },
        TypeTag::Double => match literal {
            Literal::Number(n) => n
                .as_f64()
                .map(Value::Float)
                .ok_or_else(|| invalid(literal, tag)),
            Literal::String(s) => parse_number(s, locale)
                .map(|n| Value::Float(n.as_f64()))
                .ok_or_else(|| invalid(literal, tag)),
            _ => Err(unsupported(literal, tag)),
        },
        TypeTag::Boolean => match literal {
            Literal::Bool(b) => Ok(Value::Bool(*b)),
            Literal::String(s) if s.trim().eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Literal::String(s) if s.trim().eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            Literal::String(_) => Err(invalid(literal, tag)),
            _ => Err(unsupported(literal, tag)),
        },
        TypeTag::Date | TypeTag::DateTime => match literal {
            Literal::String(s) => {
                let moment = parse_moment(s, locale, dates_as_utc).ok_or_else(|| invalid(literal, tag))?;
                // A date-only literal stays a date so it matches the whole day.
                Ok(match moment {
                    Moment::DateTime(dt) if tag == TypeTag::DateTime => Value::DateTime(dt),
                    moment => Value::Date(moment.date()),
                })
            }
            _ => Err(unsupported(literal, tag)),
        },
        TypeTag::Guid => match literal {
            Literal::String(s) => Uuid::parse_str(s.trim())
                .map(Value::Guid)
                .map_err(|_| invalid(literal, tag)),
            _ => Err(unsupported(literal, tag)),
        },
    }
}

/// Coerce every literal independently; the first failure wins.
pub fn coerce_all<'a>(
    literals: impl IntoIterator<Item = &'a Literal>,
    tag: TypeTag,
    locale: &Locale,
    dates_as_utc: bool,
) -> Result<Vec<Value>, CoercionError> {
    literals
        .into_iter()
        .map(|literal| coerce(literal, tag, locale, dates_as_utc))
        .collect()
}

/// Convert a JSON literal without a declared type.
#[must_use]
pub fn from_json(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Number(n) => n
            .as_i64()
            .map_or_else(|| Value::Float(n.as_f64().unwrap_or(f64::NAN)), Value::Int),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Array(items) => Value::List(items.iter().map(from_json).collect()),
        Literal::Object(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), from_json(v)))
                .collect(),
        ),
    }
}

/// Render a field value as text for string operators. `None` for null.
pub(crate) fn stringify(value: &Value, locale: &Locale) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Float(f) => Some(format_float(*f, locale)),
        Value::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => Some(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
        _ => Some(value.to_string()),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64).then_some(f as i64)
}

fn literal_text(literal: &Literal) -> String {
    match literal {
        Literal::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn invalid(literal: &Literal, target: TypeTag) -> CoercionError {
    CoercionError::Invalid {
        literal: literal_text(literal),
        target,
    }
}

fn unsupported(literal: &Literal, target: TypeTag) -> CoercionError {
    CoercionError::UnsupportedLiteral {
        literal: literal.to_string(),
        target,
    }
}
