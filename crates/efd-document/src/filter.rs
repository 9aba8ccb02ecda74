use crate::document::Document;
use efd_canonical::{BlockId, RecordTag};
use efd_core::CanonicalRecord;

/// Predicate over assembled records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordFilter {
    /// Records of one register.
    Tag(RecordTag),
    /// Records of one block.
    Block(BlockId),
    /// Records carrying at least one error.
    WithErrors,
}

impl RecordFilter {
    /// Whether `record` passes the filter.
    pub fn matches(&self, record: &CanonicalRecord) -> bool {
        match self {
            RecordFilter::Tag(tag) => record.tag() == tag,
            RecordFilter::Block(block) => record.block() == *block,
            RecordFilter::WithErrors => !record.is_valid(),
        }
    }
}

impl Document {
    /// Records passing every filter, with their positions.
    pub fn select<'a>(
        &'a self,
        filters: &'a [RecordFilter],
    ) -> impl Iterator<Item = (usize, &'a CanonicalRecord)> + 'a {
        self.records()
            .iter()
            .enumerate()
            .filter(move |(_, record)| filters.iter().all(|filter| filter.matches(record)))
    }
}
