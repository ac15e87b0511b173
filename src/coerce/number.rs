use winnow::ascii::digit1;
use winnow::combinator::{opt, preceded};
use winnow::error::{ErrMode, ModalResult};
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

use super::locale::Locale;

/// A number read from a locale-formatted string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            #[allow(clippy::cast_precision_loss)]
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }
}

/// Parse `text` with the locale's decimal and group separators.
///
/// The whole string must be consumed; `None` otherwise. Group separators are
/// accepted only between runs of exactly three digits, so `1,12` is `1.12`
/// under a comma-decimal locale and rejected under a comma-grouping one.
pub(crate) fn parse_number(text: &str, locale: &Locale) -> Option<Number> {
    let mut input = text.trim();
    let parsed = number(&mut input, locale).ok()?;
    input.is_empty().then_some(parsed)
}

fn number(input: &mut &str, locale: &Locale) -> ModalResult<Number> {
    let sign: Option<char> = opt(one_of(['+', '-'])).parse_next(input)?;
    let integral = opt(|i: &mut &str| integral(i, locale)).parse_next(input)?;
    let fraction: Option<&str> =
        opt(preceded(locale.decimal_separator(), digit1)).parse_next(input)?;
    if integral.is_none() && fraction.is_none() {
        return Err(ErrMode::from_input(input));
    }
    let exponent: Option<&str> = opt((
        one_of(['e', 'E']),
        opt(one_of(['+', '-'])),
        digit1::<&str, _>,
    )
        .take())
    .parse_next(input)?;

    let mut normalized = String::new();
    if sign == Some('-') {
        normalized.push('-');
    }
    normalized.push_str(integral.as_deref().unwrap_or("0"));

    if fraction.is_none() && exponent.is_none()
        && let Ok(i) = normalized.parse::<i64>()
    {
        return Ok(Number::Int(i));
    }
    if let Some(fraction) = fraction {
        normalized.push('.');
        normalized.push_str(fraction);
    }
    if let Some(exponent) = exponent {
        normalized.push_str(exponent);
    }
    normalized
        .parse::<f64>()
        .map(Number::Float)
        .map_err(|_| ErrMode::from_input(input))
}

/// Leading digits, optionally grouped in threes. Returns the digits with
/// separators removed.
fn integral(input: &mut &str, locale: &Locale) -> ModalResult<String> {
    let first: &str = digit1.parse_next(input)?;
    let mut digits = first.to_owned();
    let mut grouped = false;
    loop {
        let checkpoint = input.checkpoint();
        let group: ModalResult<(char, &str)> = (
            one_of(|c: char| locale.is_group(c)),
            take_while(3, |c: char| c.is_ascii_digit()),
        )
            .parse_next(input);
        match group {
            Ok((_, chunk)) if !input.starts_with(|c: char| c.is_ascii_digit()) => {
                digits.push_str(chunk);
                grouped = true;
            }
            _ => {
                input.reset(&checkpoint);
                break;
            }
        }
    }
    if grouped && first.len() > 3 {
        return Err(ErrMode::from_input(input));
    }
    Ok(digits)
}

/// Render a number the way the locale writes it, without grouping.
pub(crate) fn format_float(value: f64, locale: &Locale) -> String {
    let text = value.to_string();
    if locale.decimal_separator() == '.' {
        text
    } else {
        text.replace('.', &locale.decimal_separator().to_string())
    }
}
