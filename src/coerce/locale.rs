use std::fmt;

use serde::Deserialize;
use thiserror::Error;

/// Order of the day, month and year fields in a short date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    Dmy,
    Mdy,
    Ymd,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("unknown locale '{0}'")]
    Unknown(String),
}

/// Number and date conventions used when parsing string literals.
///
/// Built from a language-region tag with [`Locale::from_tag`] or assembled
/// with [`Locale::custom`]. Immutable once built; compilation copies the
/// locale out of its options, so a single compilation always sees one
/// consistent set of conventions.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Locale {
    tag: String,
    decimal: char,
    groups: Vec<char>,
    date_order: DateOrder,
    date_separator: char,
    twelve_hour: bool,
}

const NNBSP: char = '\u{202F}';
const NBSP: char = '\u{00A0}';

impl Locale {
    /// Culture-neutral conventions: `.` decimal, `,` grouping, month-first dates.
    #[must_use]
    pub fn invariant() -> Self {
        Self {
            tag: "invariant".to_owned(),
            decimal: '.',
            groups: vec![','],
            date_order: DateOrder::Mdy,
            date_separator: '/',
            twelve_hour: false,
        }
    }

    /// Resolve a language-region tag such as `de-DE` or `fr_FR`.
    ///
    /// Unknown regions fall back to the language alone (`de-AT` resolves as `de`).
    pub fn from_tag(tag: &str) -> Result<Self, LocaleError> {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        if normalized.is_empty() || normalized == "invariant" {
            return Ok(Self::invariant());
        }
        if let Some(locale) = preset(&normalized) {
            return Ok(locale);
        }
        let language = normalized.split('-').next().unwrap_or_default();
        preset(language).ok_or_else(|| LocaleError::Unknown(tag.to_owned()))
    }

    /// Start from invariant conventions under a caller-chosen name.
    #[must_use]
    pub fn custom(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::invariant()
        }
    }

    /// Set the decimal separator. The character stops being a group separator.
    #[must_use]
    pub fn decimal(mut self, separator: char) -> Self {
        self.decimal = separator;
        self.groups.retain(|&g| g != separator);
        self
    }

    /// Replace the accepted group separators.
    #[must_use]
    pub fn groups(mut self, separators: &[char]) -> Self {
        self.groups = separators
            .iter()
            .copied()
            .filter(|&g| g != self.decimal)
            .collect();
        self
    }

    #[must_use]
    pub fn date_order(mut self, order: DateOrder) -> Self {
        self.date_order = order;
        self
    }

    #[must_use]
    pub fn date_separator(mut self, separator: char) -> Self {
        self.date_separator = separator;
        self
    }

    #[must_use]
    pub fn twelve_hour(mut self, twelve_hour: bool) -> Self {
        self.twelve_hour = twelve_hour;
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn decimal_separator(&self) -> char {
        self.decimal
    }

    #[must_use]
    pub fn group_separators(&self) -> &[char] {
        &self.groups
    }

    #[must_use]
    pub fn order(&self) -> DateOrder {
        self.date_order
    }

    #[must_use]
    pub fn separator(&self) -> char {
        self.date_separator
    }

    #[must_use]
    pub fn uses_twelve_hour(&self) -> bool {
        self.twelve_hour
    }

    #[must_use]
    pub fn is_group(&self, c: char) -> bool {
        self.groups.contains(&c)
    }
}

impl Default for Locale {
    fn default() -> Self {
        Self::invariant()
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tag)
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        Locale::from_tag(&tag)
    }
}

impl std::str::FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_tag(s)
    }
}

fn preset(tag: &str) -> Option<Locale> {
    let locale = match tag {
        "en-us" | "en" => Locale::custom("en-US").twelve_hour(true),
        "en-gb" => Locale::custom("en-GB").date_order(DateOrder::Dmy),
        "de-de" | "de" => Locale::custom("de-DE")
            .decimal(',')
            .groups(&['.'])
            .date_order(DateOrder::Dmy)
            .date_separator('.'),
        "fr-fr" | "fr" => Locale::custom("fr-FR")
            .decimal(',')
            .groups(&[NNBSP, NBSP, ' '])
            .date_order(DateOrder::Dmy),
        "es-es" | "es" => Locale::custom("es-ES")
            .decimal(',')
            .groups(&['.'])
            .date_order(DateOrder::Dmy),
        "it-it" | "it" => Locale::custom("it-IT")
            .decimal(',')
            .groups(&['.'])
            .date_order(DateOrder::Dmy),
        "nl-nl" | "nl" => Locale::custom("nl-NL")
            .decimal(',')
            .groups(&['.'])
            .date_order(DateOrder::Dmy)
            .date_separator('-'),
        "ja-jp" | "ja" => Locale::custom("ja-JP").date_order(DateOrder::Ymd),
        _ => return None,
    };
    Some(locale)
}
