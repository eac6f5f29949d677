//! Scalar values bound by the mapper and their text coercions.
//!
//! Every scalar property crosses the XML boundary as text. Parsing goes
//! through [`coerce`], which uses invariant formats only; rendering goes
//! through [`render`] so a value written out reparses to itself.

use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

/// RFC 822 layout used for dates on output (`Sun, 09 Mar 2008 16:05:07 GMT`).
const RFC822_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Error for a single scalar that failed conversion.
///
/// Never fatal to a document parse; the mapper logs it and moves on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoerceError {
    #[error("expected 'true' or 'false', got '{0}'")]
    Bool(String),

    #[error("invalid integer '{0}'")]
    Int(String),

    #[error("invalid RFC 822 date '{0}'")]
    Date(String),

    #[error("invalid language tag '{0}'")]
    Language(String),
}

/// The declared type of a scalar property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Text,
    Bool,
    Int,
    Date,
    Language,
}

/// A typed scalar moving between a record and the XML stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Bool(bool),
    Int(i32),
    Date(DateTime<Utc>),
    Language(LanguageTag),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Text(_) => ValueType::Text,
            Value::Bool(_) => ValueType::Bool,
            Value::Int(_) => ValueType::Int,
            Value::Date(_) => ValueType::Date,
            Value::Language(_) => ValueType::Language,
        }
    }

    /// Whether the value is meaningful enough to be written out.
    ///
    /// Flags are written only when set and integers only when positive;
    /// absent flags and integers read back as their defaults.
    pub fn is_specified(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Int(n) => *n > 0,
            Value::Text(_) | Value::Date(_) | Value::Language(_) => true,
        }
    }
}

/// Converts raw XML text into a value of the requested type.
pub fn coerce(ty: ValueType, raw: &str) -> Result<Value, CoerceError> {
    match ty {
        ValueType::Text => Ok(Value::Text(raw.to_string())),
        ValueType::Bool => {
            let trimmed = raw.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(CoerceError::Bool(raw.to_string()))
            }
        }
        ValueType::Int => raw
            .trim()
            .parse::<i32>()
            .map(Value::Int)
            .map_err(|_| CoerceError::Int(raw.to_string())),
        ValueType::Date => parse_date(raw).map(Value::Date),
        ValueType::Language => LanguageTag::parse(raw).map(Value::Language),
    }
}

/// Renders a value as the text that [`coerce`] accepts back.
pub fn render(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Date(d) => format_date(d),
        Value::Language(tag) => tag.to_string(),
    }
}

/// Parses an RFC 822 date-time. RFC 3339 is accepted as a fallback since
/// some exporters write ISO timestamps into `dateCreated`.
pub fn parse_date(raw: &str) -> Result<DateTime<Utc>, CoerceError> {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc2822(trimmed)
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed))
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| CoerceError::Date(raw.to_string()))
}

pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(RFC822_FORMAT).to_string()
}

/// A BCP 47 style language/culture tag such as `en`, `en-US` or `zh-Hant-TW`.
///
/// Stored normalized: underscores become hyphens, the primary subtag is
/// lowercase and two-letter region subtags are uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageTag(String);

impl LanguageTag {
    pub fn parse(raw: &str) -> Result<Self, CoerceError> {
        let invalid = || CoerceError::Language(raw.to_string());
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid());
        }

        let mut subtags = Vec::new();
        for (i, part) in trimmed.split(['-', '_']).enumerate() {
            if part.is_empty() || part.len() > 8 || !part.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(invalid());
            }
            if i == 0 {
                if part.len() < 2 || !part.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid());
                }
                subtags.push(part.to_ascii_lowercase());
            } else if part.len() == 2 && part.chars().all(|c| c.is_ascii_alphabetic()) {
                subtags.push(part.to_ascii_uppercase());
            } else {
                subtags.push(part.to_string());
            }
        }

        Ok(Self(subtags.join("-")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The primary language subtag (`en` for `en-US`).
    pub fn primary(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for LanguageTag {
    type Err = CoerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
