//! Timestamp normalization.
//!
//! Upload times come as epoch milliseconds, date text, or a document-store
//! timestamp object. Each representation converts through [`ToInstant`];
//! anything that does not convert reads as instant 0 and an empty date.

use crate::models::{RawTimestamp, TimestampObject};
use chrono::{DateTime, Locale, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

/// Naive date-time layouts accepted in text, read as UTC.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts accepted in text, read as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Conversion to a concrete instant. `None` means the value cannot be converted.
pub trait ToInstant {
    fn to_instant(&self) -> Option<DateTime<Utc>>;
}

/// Epoch milliseconds; fractional milliseconds are truncated.
impl ToInstant for f64 {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        if !self.is_finite() {
            return None;
        }
        DateTime::from_timestamp_millis(self.trunc() as i64)
    }
}

impl ToInstant for str {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        let text = self.trim();
        if text.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(dt.with_timezone(&Utc));
        }

        for format in DATETIME_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                return Some(naive.and_utc());
            }
        }

        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}

impl ToInstant for TimestampObject {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.seconds?, self.nanoseconds.unwrap_or(0))
    }
}

impl ToInstant for RawTimestamp {
    fn to_instant(&self) -> Option<DateTime<Utc>> {
        match self {
            RawTimestamp::Millis(millis) => millis.to_instant(),
            RawTimestamp::Text(text) => text.as_str().to_instant(),
            RawTimestamp::Convertible(object) => object.to_instant(),
            RawTimestamp::Unsupported(_) => None,
        }
    }
}

/// Epoch milliseconds of a raw timestamp, 0 when absent or unconvertible.
pub fn normalize_instant(raw: Option<&RawTimestamp>) -> i64 {
    raw.and_then(ToInstant::to_instant)
        .map(|instant| instant.timestamp_millis())
        .unwrap_or(0)
}

/// How listed dates are rendered.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateStyle {
    pub locale: Locale,
    pub show_year: bool,
}

impl Default for DateStyle {
    fn default() -> Self {
        Self {
            locale: Locale::en_US,
            show_year: false,
        }
    }
}

impl DateStyle {
    /// Build a style from a locale name such as `en_US` or `fr-FR`.
    ///
    /// Unknown names fall back to `en_US`.
    pub fn new(locale_name: &str, show_year: bool) -> Self {
        let locale = parse_locale(locale_name).unwrap_or_else(|| {
            warn!("Unsupported locale '{}', using en_US", locale_name);
            Locale::en_US
        });

        Self { locale, show_year }
    }

    fn pattern(&self) -> &'static str {
        let month_first = matches!(self.locale, Locale::en_US | Locale::en_CA);
        match (month_first, self.show_year) {
            (true, false) => "%b %-d",
            (true, true) => "%b %-d, %Y",
            (false, false) => "%-d %b",
            (false, true) => "%-d %b %Y",
        }
    }
}

fn parse_locale(name: &str) -> Option<Locale> {
    let locale = match name.trim().replace('-', "_").as_str() {
        "en_US" | "en" => Locale::en_US,
        "en_CA" => Locale::en_CA,
        "en_GB" => Locale::en_GB,
        "en_AU" => Locale::en_AU,
        "fr_FR" | "fr" => Locale::fr_FR,
        "fr_CA" => Locale::fr_CA,
        "de_DE" | "de" => Locale::de_DE,
        "es_ES" | "es" => Locale::es_ES,
        "es_MX" => Locale::es_MX,
        "it_IT" | "it" => Locale::it_IT,
        "pt_BR" | "pt" => Locale::pt_BR,
        "nl_NL" | "nl" => Locale::nl_NL,
        _ => return None,
    };
    Some(locale)
}

/// Short listed date such as `Mar 5` or `Mar 5, 2024`.
///
/// Empty when the timestamp is absent or cannot be converted.
pub fn format_listed_date(raw: Option<&RawTimestamp>, style: &DateStyle) -> String {
    match raw.and_then(ToInstant::to_instant) {
        Some(instant) => instant
            .format_localized(style.pattern(), style.locale)
            .to_string(),
        None => String::new(),
    }
}
