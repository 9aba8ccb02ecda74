use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::validation::ErrorCategory;

/// Overall outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SummaryStatus {
    /// No diagnostics at all.
    Ok,
    /// Only business-rule or checksum findings; every field was well formed.
    Inconsistent,
    /// At least one field or structural defect.
    Invalid,
}

/// Per-category diagnostic counts for a record, a document or a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorSummary {
    /// Overall status derived from the counts.
    pub status: SummaryStatus,
    /// Number of diagnostics per category.
    pub counts: BTreeMap<ErrorCategory, u64>,
}

impl Default for ErrorSummary {
    fn default() -> Self {
        Self {
            status: SummaryStatus::Ok,
            counts: BTreeMap::new(),
        }
    }
}

impl ErrorSummary {
    /// Builds a summary from a sequence of categories.
    pub fn from_categories(categories: impl IntoIterator<Item = ErrorCategory>) -> Self {
        let mut summary = Self::default();
        for category in categories {
            summary.record(category);
        }
        summary
    }

    /// Counts one more diagnostic.
    pub fn record(&mut self, category: ErrorCategory) {
        self.counts
            .entry(category)
            .and_modify(|count| *count += 1)
            .or_insert(1);
        self.status = self.derive_status();
    }

    /// Adds the counts of another summary.
    pub fn merge(&mut self, other: &ErrorSummary) {
        for (category, count) in &other.counts {
            *self.counts.entry(*category).or_insert(0) += count;
        }
        self.status = self.derive_status();
    }

    /// Total number of diagnostics.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Whether no diagnostic was counted.
    pub fn is_clean(&self) -> bool {
        self.status == SummaryStatus::Ok
    }

    fn derive_status(&self) -> SummaryStatus {
        let mut status = SummaryStatus::Ok;
        for category in self.counts.keys() {
            match category {
                ErrorCategory::BusinessRuleViolation | ErrorCategory::ChecksumFailure => {
                    status = SummaryStatus::Inconsistent;
                }
                _ => return SummaryStatus::Invalid,
            }
        }
        status
    }
}
