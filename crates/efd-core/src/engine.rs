//! Record pipeline: standardize, check patterns, evaluate rules.

use crate::checksum::{ChecksumValidator, Modulo11};
use crate::errors::CoreError;
use crate::record::CanonicalRecord;
use crate::rules::RuleEvaluator;
use efd_canonical::{check_patterns, RawFields, RawRecord, Standardizer};
use efd_schemas::{Layout, SchemaRegistry};
use std::sync::Arc;
use tracing::debug;

/// Builds canonical records against one layout.
///
/// Stateless apart from its shared registry and checksum validator, so one
/// engine can serve any number of documents.
#[derive(Clone)]
pub struct Engine {
    registry: Arc<SchemaRegistry>,
    checksum: Arc<dyn ChecksumValidator>,
}

impl Engine {
    /// Creates an engine over a registry with the default validator.
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self::with_checksum(registry, Arc::new(Modulo11))
    }

    /// Creates an engine with a custom checksum validator.
    pub fn with_checksum(
        registry: Arc<SchemaRegistry>,
        checksum: Arc<dyn ChecksumValidator>,
    ) -> Self {
        Self { registry, checksum }
    }

    /// Engine over an embedded layout.
    pub fn builtin(layout: Layout) -> Self {
        Self::new(SchemaRegistry::builtin(layout))
    }

    /// Registry in use.
    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Standardizes, pattern-checks and rule-checks one raw record.
    ///
    /// Only an unknown tag is an `Err`; every other defect is attached to
    /// the returned record.
    pub fn standardize_and_validate(
        &self,
        tag: &str,
        raw: &RawFields,
    ) -> Result<CanonicalRecord, CoreError> {
        let schema = self.registry.get(tag.trim())?;

        let standardized = Standardizer::new(&schema.tag, &schema.fields).standardize(raw);
        let mut errors = standardized.errors;
        errors.extend(check_patterns(
            &schema.tag,
            &schema.fields,
            &standardized.values,
        ));
        errors.extend(
            RuleEvaluator::new(&schema, &standardized.values, self.checksum.as_ref()).evaluate(),
        );

        debug!(tag = %schema.tag, errors = errors.len(), "record standardized");
        Ok(CanonicalRecord::new(schema, standardized.values, errors))
    }

    /// Same as [`Engine::standardize_and_validate`] for a [`RawRecord`].
    pub fn build(&self, raw: &RawRecord) -> Result<CanonicalRecord, CoreError> {
        self.standardize_and_validate(&raw.tag, &raw.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use efd_canonical::{ErrorCategory, FieldValue};
    use serde_json::json;

    fn raw(value: serde_json::Value) -> RawFields {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn unknown_tag_is_the_only_error_result() {
        let engine = Engine::builtin(Layout::IcmsIpi);
        assert!(matches!(
            engine.standardize_and_validate("Z123", &RawFields::new()),
            Err(CoreError::UnknownRecordType(tag)) if tag == "Z123"
        ));
    }

    #[test]
    fn defects_are_attached_not_returned() {
        let engine = Engine::builtin(Layout::IcmsIpi);
        let record = engine
            .standardize_and_validate("0001", &raw(json!({"IND_MOV": "7", "EXTRA": 1})))
            .unwrap();
        let categories: Vec<ErrorCategory> =
            record.errors().iter().map(|e| e.category()).collect();
        assert!(categories.contains(&ErrorCategory::PatternMismatch));
        assert!(categories.contains(&ErrorCategory::UnknownField));
        assert_eq!(record.value("IND_MOV"), Some(&FieldValue::Text("7".into())));
    }
}
