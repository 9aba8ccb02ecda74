use efd_canonical::{BlockId, ErrorSummary, FieldValue, RecordError, RecordTag};
use efd_schemas::RecordSchema;
use std::sync::Arc;

/// One register after standardization and validation.
///
/// Values follow the schema's field order. Errors are attached when the
/// record is built and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRecord {
    schema: Arc<RecordSchema>,
    values: Vec<FieldValue>,
    errors: Vec<RecordError>,
}

impl CanonicalRecord {
    pub(crate) fn new(
        schema: Arc<RecordSchema>,
        values: Vec<FieldValue>,
        errors: Vec<RecordError>,
    ) -> Self {
        Self {
            schema,
            values,
            errors,
        }
    }

    /// Register tag.
    pub fn tag(&self) -> &RecordTag {
        &self.schema.tag
    }

    /// Schema the record was built against.
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Hierarchy level of the register.
    pub fn level(&self) -> u8 {
        self.schema.level
    }

    /// Block the register belongs to.
    pub fn block(&self) -> BlockId {
        self.schema.block()
    }

    /// Canonical values in schema order.
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    /// Value of a field by name.
    pub fn value(&self, name: &str) -> Option<&FieldValue> {
        self.schema.field_index(name).map(|i| &self.values[i])
    }

    /// Errors attached to the record.
    pub fn errors(&self) -> &[RecordError] {
        &self.errors
    }

    /// Whether the record has no errors.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Per-category summary of the record's errors.
    pub fn summary(&self) -> ErrorSummary {
        ErrorSummary::from_categories(self.errors.iter().map(RecordError::category))
    }
}
