use crate::field::FieldSpec;
use crate::identifiers::RecordTag;
use crate::validation::RecordError;
use crate::value::FieldValue;

/// Field delimiter of the line format; never allowed inside a value.
pub const FIELD_DELIMITER: char = '|';

/// Checks the canonical text of every present value against its pattern.
///
/// Absent values are skipped: requiredness was already reported by the
/// standardizer. `values` must be in the same order as `fields`.
pub fn check_patterns(
    tag: &RecordTag,
    fields: &[FieldSpec],
    values: &[FieldValue],
) -> Vec<RecordError> {
    let mut errors = Vec::new();
    for (spec, value) in fields.iter().zip(values) {
        let Some(text) = value.canonical_text() else {
            continue;
        };
        if text.contains(FIELD_DELIMITER) || !spec.pattern.is_match(&text) {
            errors.push(RecordError::PatternMismatch {
                tag: tag.clone(),
                field: spec.name.to_string(),
                value: text,
                pattern: spec.pattern.to_string(),
            });
        }
    }
    errors
}
