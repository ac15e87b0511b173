use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};

use super::locale::{DateOrder, Locale};

/// A date literal, with or without a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Moment {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl Moment {
    pub(crate) fn date(self) -> NaiveDate {
        match self {
            Moment::Date(d) => d,
            Moment::DateTime(dt) => dt.date(),
        }
    }
}

const ISO_DATE_TIMES: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse a date or date-time literal.
///
/// RFC 3339 literals carry an offset and are normalized to UTC when
/// `as_utc`, otherwise to the local wall clock. Offset-free literals are
/// taken as written: ISO 8601 first, then the locale's short date with an
/// optional time of day.
pub(crate) fn parse_moment(text: &str, locale: &Locale, as_utc: bool) -> Option<Moment> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        let naive = if as_utc {
            dt.with_timezone(&Utc).naive_utc()
        } else {
            dt.with_timezone(&Local).naive_local()
        };
        return Some(Moment::DateTime(naive));
    }
    for format in ISO_DATE_TIMES {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Moment::DateTime(dt));
        }
    }
    if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(Moment::Date(d));
    }
    parse_localized(text, locale)
}

fn parse_localized(text: &str, locale: &Locale) -> Option<Moment> {
    let sep = locale.separator();
    let date = match locale.order() {
        DateOrder::Dmy => format!("%d{sep}%m{sep}%Y"),
        DateOrder::Mdy => format!("%m{sep}%d{sep}%Y"),
        DateOrder::Ymd => format!("%Y{sep}%m{sep}%d"),
    };
    let mut times = vec![" %H:%M:%S", " %H:%M"];
    if locale.uses_twelve_hour() {
        times.extend([" %I:%M:%S %p", " %I:%M %p"]);
    }
    for time in times {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, &format!("{date}{time}")) {
            return Some(Moment::DateTime(dt));
        }
    }
    NaiveDate::parse_from_str(text, &date).ok().map(Moment::Date)
}
