//! Hierarchy assembly.
//!
//! A [`Document`] accepts canonical records in emission order and keeps a
//! stack of open contexts. Every record is attached, even when it breaks the
//! hierarchy; the problem is reported as a [`StructuralViolation`] instead.
//! Counts declared by closing registers are checked when the document is
//! finished, since the envelope record `9999` is counted by its block after
//! `9990` has been emitted.

use crate::format::LineFormats;
use crate::serializer::serialize;
use crate::violation::StructuralViolation;
use efd_canonical::{BlockId, ErrorCategory, ErrorSummary, RecordError, RecordTag};
use efd_core::CanonicalRecord;
use efd_schemas::CountDeclaration;
use rust_decimal::prelude::ToPrimitive;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Outcome of [`Document::assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    /// Emission index of the record; `None` when it was rejected.
    pub position: Option<usize>,
    /// Violations caused by this record.
    pub violations: Vec<StructuralViolation>,
}

/// Counts a caller declares when closing a block explicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredCounts {
    /// Expected number of records per register tag.
    pub registers: BTreeMap<RecordTag, u64>,
    /// Expected number of lines of the block.
    pub lines: Option<u64>,
}

impl DeclaredCounts {
    /// Declares the count of one register.
    pub fn register(mut self, tag: RecordTag, count: u64) -> Self {
        self.registers.insert(tag, count);
        self
    }

    /// Declares the block line count.
    pub fn lines(mut self, lines: u64) -> Self {
        self.lines = Some(lines);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockStatus {
    Pending,
    Open,
    Closed,
}

#[derive(Debug, Clone)]
struct BlockState {
    id: BlockId,
    status: BlockStatus,
    counts: BTreeMap<RecordTag, u64>,
    lines: u64,
}

#[derive(Debug, Clone)]
struct OpenEntry {
    level: u8,
    tag: RecordTag,
    position: usize,
}

#[derive(Debug, Clone)]
enum Declaration {
    BlockLines {
        position: usize,
        block: BlockId,
        declared: u64,
    },
    RegisterCount {
        position: usize,
        tag: String,
        declared: u64,
    },
    FileLines {
        position: usize,
        declared: u64,
    },
}

/// Ordered EFD document under assembly.
#[derive(Debug, Clone, Default)]
pub struct Document {
    formats: LineFormats,
    records: Vec<CanonicalRecord>,
    parents: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    stack: Vec<OpenEntry>,
    blocks: Vec<BlockState>,
    file_counts: BTreeMap<RecordTag, u64>,
    declarations: Vec<Declaration>,
    violations: Vec<StructuralViolation>,
    finished: bool,
}

impl Document {
    /// Creates an empty document with the given line formats.
    pub fn new(formats: LineFormats) -> Self {
        Self {
            formats,
            ..Self::default()
        }
    }

    /// Appends a record, attaching it to the innermost suitable context.
    pub fn assemble(&mut self, record: CanonicalRecord) -> Assembled {
        if self.finished {
            let violation = StructuralViolation::DocumentFinished {
                tag: record.tag().to_string(),
            };
            return Assembled {
                position: None,
                violations: self.report(vec![violation]),
            };
        }

        let position = self.records.len();
        let level = record.level();
        let schema = record.schema().clone();
        let block = record.block();
        let mut violations = Vec::new();

        while self.stack.last().is_some_and(|entry| entry.level >= level) {
            self.stack.pop();
        }

        let state = self.block_state(block);
        if level > 0 && state.status == BlockStatus::Closed {
            violations.push(StructuralViolation::BlockClosed {
                position: Some(position),
                block,
            });
        } else if schema.is_block_opener() {
            state.status = BlockStatus::Open;
        }

        let top = self.stack.last();
        let parent = top.map(|entry| entry.position);
        if level > 1 {
            let attached = top.is_some_and(|entry| {
                entry.level + 1 == level && Some(&entry.tag) == schema.parent.as_ref()
            });
            if !attached {
                violations.push(StructuralViolation::UnexpectedParent {
                    position,
                    tag: schema.tag.to_string(),
                    expected: schema
                        .parent
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                    found: top.map(|entry| entry.tag.to_string()),
                });
            }
        }

        self.stack.push(OpenEntry {
            level,
            tag: schema.tag.clone(),
            position,
        });
        let state = self.block_state(block);
        *state.counts.entry(schema.tag.clone()).or_default() += 1;
        state.lines += 1;
        *self.file_counts.entry(schema.tag.clone()).or_default() += 1;

        if let Some(count) = &schema.count {
            self.record_declaration(position, block, count, &record);
        }

        if let Some(parent) = parent {
            self.children[parent].push(position);
        }
        self.parents.push(parent);
        self.children.push(Vec::new());
        self.records.push(record);

        Assembled {
            position: Some(position),
            violations: self.report(violations),
        }
    }

    fn record_declaration(
        &mut self,
        position: usize,
        block: BlockId,
        count: &CountDeclaration,
        record: &CanonicalRecord,
    ) {
        let declared = |field: &str| {
            record
                .value(field)
                .and_then(|value| value.as_decimal())
                .and_then(|d| d.to_u64())
        };
        match count {
            CountDeclaration::BlockLines { field } => {
                if let Some(declared) = declared(field.as_str()) {
                    self.declarations.push(Declaration::BlockLines {
                        position,
                        block,
                        declared,
                    });
                }
                self.close(block);
            }
            CountDeclaration::RegisterCount {
                register_field,
                count_field,
            } => {
                let tag = record
                    .value(register_field.as_str())
                    .and_then(|value| value.canonical_text());
                if let (Some(tag), Some(declared)) = (tag, declared(count_field.as_str())) {
                    self.declarations.push(Declaration::RegisterCount {
                        position,
                        tag,
                        declared,
                    });
                }
            }
            CountDeclaration::FileLines { field } => {
                if let Some(declared) = declared(field.as_str()) {
                    self.declarations
                        .push(Declaration::FileLines { position, declared });
                }
            }
        }
    }

    /// Closes `block`, comparing `declared` with the accumulated counters.
    pub fn close_block(
        &mut self,
        block: BlockId,
        declared: &DeclaredCounts,
    ) -> Vec<StructuralViolation> {
        if self.finished {
            return self.report(vec![StructuralViolation::DocumentFinished {
                tag: block.closer(),
            }]);
        }
        let state = self.block_state(block);
        if state.status == BlockStatus::Closed {
            return self.report(vec![StructuralViolation::BlockClosed {
                position: None,
                block,
            }]);
        }

        let mut violations = Vec::new();
        for (tag, &expected) in &declared.registers {
            let actual = state.counts.get(tag).copied().unwrap_or(0);
            if actual != expected {
                violations.push(StructuralViolation::CountMismatch {
                    position: None,
                    subject: tag.to_string(),
                    declared: expected,
                    actual,
                });
            }
        }
        if let Some(expected) = declared.lines {
            if state.lines != expected {
                violations.push(StructuralViolation::CountMismatch {
                    position: None,
                    subject: format!("block {block}"),
                    declared: expected,
                    actual: state.lines,
                });
            }
        }
        self.close(block);
        self.report(violations)
    }

    fn close(&mut self, block: BlockId) {
        self.block_state(block).status = BlockStatus::Closed;
        self.stack
            .retain(|entry| entry.level == 0 || entry.tag.block() != block);
    }

    /// Finalizes the document and checks every declared count.
    ///
    /// Calling it again returns no new violations.
    pub fn finish(&mut self) -> Vec<StructuralViolation> {
        if self.finished {
            return Vec::new();
        }
        self.finished = true;

        let mut violations: Vec<StructuralViolation> = self
            .blocks
            .iter()
            .filter(|state| state.status == BlockStatus::Open)
            .map(|state| StructuralViolation::BlockNotClosed { block: state.id })
            .collect();

        let mut declared_tags = BTreeSet::new();
        for declaration in &self.declarations {
            match declaration {
                Declaration::BlockLines {
                    position,
                    block,
                    declared,
                } => {
                    let actual = self
                        .blocks
                        .iter()
                        .find(|state| state.id == *block)
                        .map_or(0, |state| state.lines);
                    if actual != *declared {
                        violations.push(StructuralViolation::CountMismatch {
                            position: Some(*position),
                            subject: format!("block {block}"),
                            declared: *declared,
                            actual,
                        });
                    }
                }
                Declaration::RegisterCount {
                    position,
                    tag,
                    declared,
                } => {
                    if !declared_tags.insert(tag.as_str()) {
                        violations.push(StructuralViolation::DuplicateDeclaration {
                            position: *position,
                            tag: tag.clone(),
                        });
                        continue;
                    }
                    let actual = self
                        .file_counts
                        .iter()
                        .find(|(counted, _)| counted.as_str() == tag)
                        .map_or(0, |(_, &count)| count);
                    if actual != *declared {
                        violations.push(StructuralViolation::CountMismatch {
                            position: Some(*position),
                            subject: tag.clone(),
                            declared: *declared,
                            actual,
                        });
                    }
                }
                Declaration::FileLines { position, declared } => {
                    let actual = self.records.len() as u64;
                    if actual != *declared {
                        violations.push(StructuralViolation::CountMismatch {
                            position: Some(*position),
                            subject: "file".into(),
                            declared: *declared,
                            actual,
                        });
                    }
                }
            }
        }

        if !declared_tags.is_empty() {
            for tag in self.file_counts.keys() {
                if !declared_tags.contains(tag.as_str()) {
                    violations.push(StructuralViolation::UndeclaredRegister {
                        tag: tag.to_string(),
                    });
                }
            }
        }

        let violations = self.report(violations);
        info!(
            records = self.records.len(),
            violations = self.violations.len(),
            "document finished"
        );
        violations
    }

    fn block_state(&mut self, block: BlockId) -> &mut BlockState {
        let index = match self.blocks.iter().position(|state| state.id == block) {
            Some(index) => index,
            None => {
                self.blocks.push(BlockState {
                    id: block,
                    status: BlockStatus::Pending,
                    counts: BTreeMap::new(),
                    lines: 0,
                });
                self.blocks.len() - 1
            }
        };
        &mut self.blocks[index]
    }

    fn report(&mut self, violations: Vec<StructuralViolation>) -> Vec<StructuralViolation> {
        for violation in &violations {
            warn!(%violation, "structural violation");
        }
        self.violations.extend(violations.iter().cloned());
        violations
    }

    /// Records in emission order.
    pub fn records(&self) -> &[CanonicalRecord] {
        &self.records
    }

    /// Record at a position.
    pub fn record(&self, position: usize) -> Option<&CanonicalRecord> {
        self.records.get(position)
    }

    /// Parent position of a record.
    pub fn parent(&self, position: usize) -> Option<usize> {
        self.parents.get(position).copied().flatten()
    }

    /// Child positions of a record, in emission order.
    pub fn children(&self, position: usize) -> &[usize] {
        self.children
            .get(position)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every structural violation reported so far.
    pub fn violations(&self) -> &[StructuralViolation] {
        &self.violations
    }

    /// Per-register counts of a block.
    pub fn block_counts(&self, block: BlockId) -> Option<&BTreeMap<RecordTag, u64>> {
        self.blocks
            .iter()
            .find(|state| state.id == block)
            .map(|state| &state.counts)
    }

    /// Lines counted for a block, including its envelope record.
    pub fn block_lines(&self, block: BlockId) -> u64 {
        self.blocks
            .iter()
            .find(|state| state.id == block)
            .map_or(0, |state| state.lines)
    }

    /// Per-register counts over the whole document.
    pub fn register_counts(&self) -> &BTreeMap<RecordTag, u64> {
        &self.file_counts
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no record was assembled.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether [`Document::finish`] was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Record errors with the position of their record.
    pub fn record_errors(&self) -> impl Iterator<Item = (usize, &RecordError)> {
        self.records
            .iter()
            .enumerate()
            .flat_map(|(position, record)| record.errors().iter().map(move |e| (position, e)))
    }

    /// Summary over record errors and structural violations.
    pub fn summary(&self) -> ErrorSummary {
        let mut summary =
            ErrorSummary::from_categories(self.record_errors().map(|(_, e)| e.category()));
        for _ in &self.violations {
            summary.record(ErrorCategory::StructuralViolation);
        }
        summary
    }

    /// Whether neither records nor structure carry diagnostics.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty() && self.records.iter().all(CanonicalRecord::is_valid)
    }

    /// Serialized lines in emission order, without terminators.
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        self.records
            .iter()
            .map(|record| serialize(record, self.formats.for_block(record.block())))
    }

    /// Lines paired with the terminator of their block's format.
    pub(crate) fn terminated_lines(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        self.records.iter().map(|record| {
            let format = self.formats.for_block(record.block());
            (serialize(record, format), format.terminator.as_str())
        })
    }

    /// Whole file text: every line followed by its terminator.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (line, terminator) in self.terminated_lines() {
            out.push_str(&line);
            out.push_str(terminator);
        }
        out
    }
}
