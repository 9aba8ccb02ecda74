use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date rendering used for canonical text and the line format (`DDMMYYYY`).
pub const DATE_FORMAT: &str = "%d%m%Y";

/// Value kind declared by a field spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Free text; leading and trailing whitespace is removed.
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// Decimal number, fixed-point when the field declares a scale.
    Decimal,
    /// Calendar date.
    Date,
}

impl ValueKind {
    /// Pattern applied when a field spec does not declare one.
    pub fn default_pattern(self) -> &'static str {
        match self {
            ValueKind::Text => r"^.+$",
            ValueKind::Integer => r"^\d+$",
            ValueKind::Decimal => r"^\d+(\.\d+)?$",
            ValueKind::Date => r"^\d{8}$",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Decimal => "decimal",
            ValueKind::Date => "date",
        };
        f.write_str(name)
    }
}

/// Canonical value of one field.
///
/// `Absent` is kept distinct from zero and from an empty string because
/// rules tell "not supplied" apart from "supplied as zero".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "t", content = "v", rename_all = "snake_case")]
pub enum FieldValue {
    /// Not supplied (or not coercible).
    Absent,
    /// Trimmed text.
    Text(String),
    /// Integer value.
    Integer(i64),
    /// Decimal value, already rounded to the field scale.
    Decimal(Decimal),
    /// Calendar date.
    Date(NaiveDate),
}

impl FieldValue {
    /// Whether the value was not supplied.
    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    /// Whether a value is present.
    pub fn is_present(&self) -> bool {
        !self.is_absent()
    }

    /// Numeric view of integer and decimal values.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            FieldValue::Integer(v) => Some(Decimal::from(*v)),
            FieldValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view of text values.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Whether the value is absent or numerically zero.
    pub fn is_absent_or_zero(&self) -> bool {
        match self {
            FieldValue::Absent => true,
            other => other.as_decimal().is_some_and(|d| d.is_zero()),
        }
    }

    /// Canonical text form used for pattern checks and comparisons.
    ///
    /// Decimals keep their scale and use `.` as separator; dates render as
    /// `DDMMYYYY`. Returns `None` for absent values.
    pub fn canonical_text(&self) -> Option<String> {
        match self {
            FieldValue::Absent => None,
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Integer(v) => Some(v.to_string()),
            FieldValue::Decimal(v) => Some(v.to_string()),
            FieldValue::Date(d) => Some(d.format(DATE_FORMAT).to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn canonical_text_keeps_decimal_scale() {
        let value = FieldValue::Decimal(Decimal::from_str("10.00").unwrap());
        assert_eq!(value.canonical_text().as_deref(), Some("10.00"));
    }

    #[test]
    fn canonical_text_renders_dates_day_first() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(
            FieldValue::Date(date).canonical_text().as_deref(),
            Some("05032024")
        );
    }

    #[test]
    fn absent_is_not_zero_but_counts_as_zero_for_presence() {
        assert_ne!(FieldValue::Absent, FieldValue::Decimal(Decimal::ZERO));
        assert!(FieldValue::Absent.is_absent_or_zero());
        assert!(FieldValue::Integer(0).is_absent_or_zero());
        assert!(!FieldValue::Text("0".into()).is_absent_or_zero());
    }
}
