//! Per-field extraction results.
//!
//! Every field of a listing row is parsed by its own small extractor
//! returning an [`Extracted`] value: the parsed value, an explicit
//! "no data" state, or a failure describing what went wrong. A broken
//! field never aborts the row; the caller inspects the result and
//! degrades the field to absent, so a row with an unparseable GPA still
//! yields a usable post.

use chrono::NaiveDate;
use thiserror::Error;

/// Placeholder the site uses for fields the poster left empty.
pub const NOT_APPLICABLE: &str = "n/a";

/// Date format used throughout the listing, e.g. "12 Feb 2021".
pub const DATE_FORMAT: &str = "%d %b %Y";

/// Why a field failed to extract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Input did not match the expected pattern
    #[error("pattern mismatch on {0:?}")]
    Pattern(String),

    /// Input was not a valid number
    #[error("invalid number {0:?}")]
    Number(String),

    /// Input was not a valid date
    #[error("invalid date {0:?}")]
    Date(String),
}

/// Outcome of one field extraction.
#[derive(Debug, Clone, PartialEq)]
pub enum Extracted<T> {
    /// The field parsed successfully
    Value(T),
    /// The field carries no data (empty, or an explicit placeholder)
    Absent,
    /// The field carries data that could not be parsed
    Failed(FieldError),
}

impl<T> Extracted<T> {
    /// Apply `f` to a successful value, passing the other states through.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Extracted<U> {
        match self {
            Extracted::Value(value) => Extracted::Value(f(value)),
            Extracted::Absent => Extracted::Absent,
            Extracted::Failed(e) => Extracted::Failed(e),
        }
    }

    /// Chain a dependent extractor onto a successful value.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Extracted<U>) -> Extracted<U> {
        match self {
            Extracted::Value(value) => f(value),
            Extracted::Absent => Extracted::Absent,
            Extracted::Failed(e) => Extracted::Failed(e),
        }
    }

    /// Collapse to an `Option`, logging a failure under the field's name.
    pub fn into_option(self, field: &str) -> Option<T> {
        match self {
            Extracted::Value(value) => Some(value),
            Extracted::Absent => None,
            Extracted::Failed(e) => {
                log::warn!("Failed to parse {field}: {e}");
                None
            }
        }
    }
}

/// Trimmed non-empty text; empty text is absent, never an error.
pub fn non_empty(text: &str) -> Extracted<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Extracted::Absent
    } else {
        Extracted::Value(trimmed.to_string())
    }
}

/// Numeric field; empty or the `n/a` placeholder is absent.
pub fn numeric(text: &str) -> Extracted<f64> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == NOT_APPLICABLE {
        return Extracted::Absent;
    }
    match trimmed.parse::<f64>() {
        Ok(value) => Extracted::Value(value),
        Err(_) => Extracted::Failed(FieldError::Number(trimmed.to_string())),
    }
}

/// Date field in the listing's "12 Feb 2021" format.
pub fn date(text: &str) -> Extracted<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Extracted::Absent;
    }
    match NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        Ok(parsed) => Extracted::Value(parsed),
        Err(_) => Extracted::Failed(FieldError::Date(trimmed.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_trims_and_rejects_blank() {
        assert_eq!(
            non_empty("  CMU  "),
            Extracted::Value("CMU".to_string())
        );
        assert_eq!(non_empty("   "), Extracted::Absent);
    }

    #[test]
    fn test_numeric_states() {
        assert_eq!(numeric("3.06"), Extracted::Value(3.06));
        assert_eq!(numeric("n/a"), Extracted::Absent);
        assert_eq!(numeric(""), Extracted::Absent);
        assert_eq!(
            numeric("3.0a"),
            Extracted::Failed(FieldError::Number("3.0a".to_string()))
        );
    }

    #[test]
    fn test_date_states() {
        assert_eq!(
            date("12 Feb 2021"),
            Extracted::Value(NaiveDate::from_ymd_opt(2021, 2, 12).unwrap())
        );
        assert_eq!(date(""), Extracted::Absent);
        assert_eq!(
            date("Feb 12"),
            Extracted::Failed(FieldError::Date("Feb 12".to_string()))
        );
    }

    #[test]
    fn test_and_then_short_circuits() {
        let doubled = numeric("2").and_then(|v| Extracted::Value(v * 2.0));
        assert_eq!(doubled, Extracted::Value(4.0));

        let absent = numeric("n/a").and_then(|v| Extracted::Value(v * 2.0));
        assert_eq!(absent, Extracted::Absent);

        let failed = numeric("x").map(|v| v * 2.0);
        assert!(matches!(failed, Extracted::Failed(FieldError::Number(_))));
    }
}
