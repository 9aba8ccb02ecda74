use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::field::FieldSpec;
use crate::identifiers::RecordTag;
use crate::raw::{is_blank, RawFields};
use crate::validation::RecordError;
use crate::value::{FieldValue, ValueKind, DATE_FORMAT};

/// Result of standardizing one raw record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standardized {
    /// Canonical values in field-spec order.
    pub values: Vec<FieldValue>,
    /// Requiredness, coercion and unknown-key errors.
    pub errors: Vec<RecordError>,
}

/// Turns loosely typed inputs into canonical values for one register.
///
/// Standardization never stops at the first problem: every field is visited
/// and every defect is reported. Failed fields become [`FieldValue::Absent`].
pub struct Standardizer<'a> {
    tag: &'a RecordTag,
    fields: &'a [FieldSpec],
}

impl<'a> Standardizer<'a> {
    /// Creates a standardizer for the given register fields.
    pub fn new(tag: &'a RecordTag, fields: &'a [FieldSpec]) -> Self {
        Self { tag, fields }
    }

    /// Produces canonical values and errors.
    pub fn standardize(&self, raw: &RawFields) -> Standardized {
        let mut slots: Vec<Option<&Value>> = vec![None; self.fields.len()];
        let mut errors = Vec::new();

        for (key, value) in raw {
            match self.fields.iter().position(|spec| spec.name.matches_key(key)) {
                Some(index) => {
                    // BTreeMap order makes the first spelling of a key win.
                    if slots[index].is_none() {
                        slots[index] = Some(value);
                    }
                }
                None => errors.push(RecordError::UnknownField {
                    tag: self.tag.clone(),
                    field: key.clone(),
                }),
            }
        }

        let mut values = Vec::with_capacity(self.fields.len());
        for (spec, slot) in self.fields.iter().zip(slots) {
            let value = match slot.filter(|value| !is_blank(value)) {
                None => {
                    if spec.required {
                        errors.push(RecordError::MissingRequiredField {
                            tag: self.tag.clone(),
                            field: spec.name.to_string(),
                        });
                    }
                    FieldValue::Absent
                }
                Some(raw) => match coerce(spec, raw) {
                    Ok(value) => value,
                    Err(reason) => {
                        errors.push(RecordError::TypeCoercionFailure {
                            tag: self.tag.clone(),
                            field: spec.name.to_string(),
                            value: raw_text(raw),
                            kind: spec.kind,
                            reason,
                        });
                        FieldValue::Absent
                    }
                },
            };
            values.push(value);
        }

        Standardized { values, errors }
    }
}

fn raw_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn coerce(spec: &FieldSpec, raw: &Value) -> Result<FieldValue, String> {
    match spec.kind {
        ValueKind::Text => coerce_text(raw),
        ValueKind::Integer => coerce_integer(raw),
        ValueKind::Date => coerce_date(raw),
        ValueKind::Decimal => {
            let parsed = parse_decimal(raw)?;
            match spec.scale {
                Some(scale) => scale
                    .apply(parsed)
                    .map(FieldValue::Decimal)
                    .map_err(|_| format!("more than {} significant digits", scale.total())),
                None => Ok(FieldValue::Decimal(parsed)),
            }
        }
    }
}

fn coerce_text(raw: &Value) -> Result<FieldValue, String> {
    match raw {
        Value::String(s) => Ok(FieldValue::Text(s.trim().to_string())),
        Value::Number(n) => Ok(FieldValue::Text(n.to_string())),
        Value::Bool(b) => Ok(FieldValue::Text(b.to_string())),
        _ => Err("expected a scalar value".to_string()),
    }
}

fn coerce_integer(raw: &Value) -> Result<FieldValue, String> {
    match raw {
        Value::Number(n) => n
            .as_i64()
            .map(FieldValue::Integer)
            .ok_or_else(|| "not an integer".to_string()),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(FieldValue::Integer)
            .map_err(|err| err.to_string()),
        _ => Err("expected a number or a digit string".to_string()),
    }
}

fn coerce_date(raw: &Value) -> Result<FieldValue, String> {
    let text = match raw {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return Err("expected DDMMYYYY or YYYY-MM-DD".to_string()),
    };
    let bytes = text.as_bytes();
    let parsed = if bytes.len() == 8 && bytes.iter().all(u8::is_ascii_digit) {
        NaiveDate::parse_from_str(&text, DATE_FORMAT)
    } else if bytes.len() == 10 {
        NaiveDate::parse_from_str(&text, "%Y-%m-%d")
    } else {
        return Err("expected DDMMYYYY or YYYY-MM-DD".to_string());
    };
    parsed
        .map(FieldValue::Date)
        .map_err(|err| format!("not a calendar date: {err}"))
}

fn parse_decimal(raw: &Value) -> Result<Decimal, String> {
    let text = match raw {
        Value::Number(n) => n.to_string(),
        Value::String(s) => {
            let s = s.trim();
            if s.contains(',') {
                if s.contains('.') {
                    return Err("mixed decimal separators".to_string());
                }
                s.replacen(',', ".", 1)
            } else {
                s.to_string()
            }
        }
        _ => return Err("expected a number or a numeric string".to_string()),
    };
    Decimal::from_str_exact(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .or_else(|_| Decimal::from_str(&text))
        .map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::ErrorCategory;
    use serde_json::json;

    fn specs() -> Vec<FieldSpec> {
        vec![
            FieldSpec::new("COD_PART", ValueKind::Text, false, None, None).unwrap(),
            FieldSpec::new("DT_DOC", ValueKind::Date, true, None, None).unwrap(),
            FieldSpec::new("VL_DOC", ValueKind::Decimal, true, Some("15v2"), None).unwrap(),
            FieldSpec::new("QTD", ValueKind::Integer, false, None, None).unwrap(),
        ]
    }

    fn run(raw: serde_json::Value) -> Standardized {
        let tag = RecordTag::parse("C100").unwrap();
        let specs = specs();
        let fields: RawFields = serde_json::from_value(raw).unwrap();
        Standardizer::new(&tag, &specs).standardize(&fields)
    }

    #[test]
    fn coerces_every_kind() {
        let out = run(json!({
            "COD_PART": "  F001 ",
            "DT_DOC": "2024-01-31",
            "VL_DOC": "1234,567",
            "QTD": 3
        }));
        assert!(out.errors.is_empty(), "{:?}", out.errors);
        assert_eq!(out.values[0], FieldValue::Text("F001".into()));
        assert_eq!(
            out.values[1],
            FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap())
        );
        assert_eq!(out.values[2].canonical_text().as_deref(), Some("1234.57"));
        assert_eq!(out.values[3], FieldValue::Integer(3));
    }

    #[test]
    fn blank_required_fields_are_missing() {
        let out = run(json!({"DT_DOC": "   ", "VL_DOC": null}));
        let categories: Vec<_> = out.errors.iter().map(RecordError::category).collect();
        assert_eq!(
            categories,
            vec![
                ErrorCategory::MissingRequiredField,
                ErrorCategory::MissingRequiredField
            ]
        );
        assert!(out.values.iter().all(FieldValue::is_absent));
    }

    #[test]
    fn keys_match_case_insensitively_and_unknown_keys_are_reported() {
        let out = run(json!({"dt_doc": "01022024", "vl_doc": 10, "VL_DESC": 1}));
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].category(), ErrorCategory::UnknownField);
        assert_eq!(out.errors[0].field(), "VL_DESC");
        assert!(out.values[1].is_present());
    }

    #[test]
    fn invalid_dates_and_numbers_fail_coercion() {
        let out = run(json!({"DT_DOC": "31022024", "VL_DOC": "abc", "QTD": 1.5}));
        assert_eq!(out.errors.len(), 3);
        assert!(out
            .errors
            .iter()
            .all(|e| e.category() == ErrorCategory::TypeCoercionFailure));
        assert!(out.values[1].is_absent());
    }

    #[test]
    fn too_many_digits_for_scale_is_a_coercion_failure() {
        let out = run(json!({"DT_DOC": "01012024", "VL_DOC": "12345678901234.00"}));
        assert_eq!(out.errors.len(), 1);
        assert_eq!(out.errors[0].field(), "VL_DOC");
        assert_eq!(out.errors[0].category(), ErrorCategory::TypeCoercionFailure);
    }
}
