use efd_canonical::{
    check_patterns, Digest, DigestAlg, ErrorCategory, ErrorSummary, FieldSpec, FieldValue,
    RawFields, RecordError, RecordTag, Standardizer, ValueKind,
};
use proptest::prelude::*;
use serde_json::json;

fn c170_fields() -> Vec<FieldSpec> {
    vec![
        FieldSpec::new("NUM_ITEM", ValueKind::Text, true, None, Some(r"^\d{1,3}$")).unwrap(),
        FieldSpec::new("QTD", ValueKind::Decimal, false, Some("19v5"), None).unwrap(),
        FieldSpec::new("VL_ITEM", ValueKind::Decimal, true, Some("15v2"), None).unwrap(),
        FieldSpec::new("ALIQ_ICMS", ValueKind::Decimal, false, Some("6v2"), None).unwrap(),
    ]
}

#[test]
fn digest_serializes_to_golden_json() {
    let digest = Digest {
        alg: DigestAlg::Sha256,
        b64: "Zm9vYmFy".into(),
    };

    assert_eq!(
        serde_json::to_string(&digest).unwrap(),
        r#"{"alg":"sha-256","b64":"Zm9vYmFy"}"#
    );
}

#[test]
fn record_error_serializes_with_category_tag() {
    let error = RecordError::MissingRequiredField {
        tag: RecordTag::parse("C100").unwrap(),
        field: "VL_DOC".into(),
    };

    assert_eq!(
        serde_json::to_value(&error).unwrap(),
        json!({"category": "missing_required_field", "tag": "C100", "field": "VL_DOC"})
    );
    assert_eq!(
        error.to_string(),
        "[C100] required field VL_DOC was not supplied"
    );
}

#[test]
fn summary_matches_expected_shape() {
    let summary = ErrorSummary::from_categories([
        ErrorCategory::PatternMismatch,
        ErrorCategory::PatternMismatch,
    ]);
    assert_eq!(
        serde_json::to_value(&summary).unwrap(),
        json!({"status": "Invalid", "counts": {"pattern_mismatch": 2}})
    );
}

#[test]
fn conformant_record_has_no_field_errors() {
    let tag = RecordTag::parse("C170").unwrap();
    let fields = c170_fields();
    let raw: RawFields = serde_json::from_value(json!({
        "NUM_ITEM": "1",
        "QTD": "2.5",
        "VL_ITEM": 100,
        "ALIQ_ICMS": "18"
    }))
    .unwrap();

    let standardized = Standardizer::new(&tag, &fields).standardize(&raw);
    let pattern_errors = check_patterns(&tag, &fields, &standardized.values);

    assert!(standardized.errors.is_empty());
    assert!(pattern_errors.is_empty());
    assert_eq!(
        standardized.values[1].canonical_text().as_deref(),
        Some("2.50000")
    );
}

#[test]
fn absent_optional_differs_from_supplied_zero() {
    let tag = RecordTag::parse("C170").unwrap();
    let fields = c170_fields();
    let absent: RawFields =
        serde_json::from_value(json!({"NUM_ITEM": "1", "VL_ITEM": "1"})).unwrap();
    let zero: RawFields =
        serde_json::from_value(json!({"NUM_ITEM": "1", "VL_ITEM": "1", "ALIQ_ICMS": 0}))
            .unwrap();

    let standardizer = Standardizer::new(&tag, &fields);
    assert_eq!(standardizer.standardize(&absent).values[3], FieldValue::Absent);
    assert_eq!(
        standardizer.standardize(&zero).values[3].canonical_text().as_deref(),
        Some("0.00")
    );
}

proptest! {
    #[test]
    fn standardization_is_deterministic(
        item in "[0-9]{1,3}",
        cents in 0i64..1_000_000_000,
        extra in proptest::option::of("[a-z_]{1,8}"),
    ) {
        let tag = RecordTag::parse("C170").unwrap();
        let fields = c170_fields();
        let mut raw: RawFields = serde_json::from_value(json!({
            "NUM_ITEM": item,
            "VL_ITEM": format!("{}.{:02}", cents / 100, cents % 100),
        }))
        .unwrap();
        if let Some(key) = extra {
            raw.insert(key, json!("x"));
        }

        let standardizer = Standardizer::new(&tag, &fields);
        prop_assert_eq!(standardizer.standardize(&raw), standardizer.standardize(&raw));
    }

    #[test]
    fn scaled_values_always_carry_declared_places(whole in 0u32..1_000_000, frac in 0u32..1000) {
        let tag = RecordTag::parse("C170").unwrap();
        let fields = c170_fields();
        let raw: RawFields = serde_json::from_value(json!({
            "NUM_ITEM": "1",
            "VL_ITEM": format!("{whole}.{frac:03}"),
        }))
        .unwrap();

        let out = Standardizer::new(&tag, &fields).standardize(&raw);
        let text = out.values[2].canonical_text().unwrap();
        let places = text.split('.').nth(1).map(str::len);
        prop_assert_eq!(places, Some(2));
    }
}
