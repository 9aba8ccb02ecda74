//! Output formatting utilities.

use crate::input::Assembly;
use efd_canonical::FieldSpec;
use efd_document::{Document, StructuralViolation};
use serde::Serialize;

/// One line of a validation report.
#[derive(Debug, Serialize)]
pub struct Diagnostic {
    /// Document position, or input index for rejected records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub category: String,
    pub message: String,
}

/// Flattens record errors, structural violations and rejected inputs.
pub fn diagnostics(assembly: &Assembly) -> Vec<Diagnostic> {
    let document = &assembly.document;
    let mut out: Vec<Diagnostic> = document
        .record_errors()
        .map(|(position, error)| Diagnostic {
            position: Some(position),
            tag: document.record(position).map(|r| r.tag().to_string()),
            category: format!("{:?}", error.category()),
            message: error.to_string(),
        })
        .collect();

    out.extend(document.violations().iter().map(|violation| Diagnostic {
        position: violation.position(),
        tag: violation_tag(document, violation),
        category: "StructuralViolation".to_string(),
        message: violation.to_string(),
    }));

    out.extend(assembly.rejected.iter().map(|rejected| Diagnostic {
        position: Some(rejected.index),
        tag: Some(rejected.tag.clone()),
        category: "UnknownRecordType".to_string(),
        message: format!("input record {} has unknown register type {}", rejected.index, rejected.tag),
    }));
    out
}

fn violation_tag(document: &Document, violation: &StructuralViolation) -> Option<String> {
    if let Some(record) = violation.position().and_then(|p| document.record(p)) {
        return Some(record.tag().to_string());
    }
    match violation {
        StructuralViolation::UndeclaredRegister { tag }
        | StructuralViolation::DocumentFinished { tag } => Some(tag.clone()),
        _ => None,
    }
}

/// Formats a position column.
pub fn format_position(position: Option<usize>) -> String {
    position.map_or_else(|| "-".to_string(), |p| p.to_string())
}

/// Prints the diagnostic table header.
#[allow(clippy::print_literal)]
pub fn print_diagnostic_header() {
    println!("{:<8} {:<6} {:<22} {}", "POSITION", "TAG", "CATEGORY", "MESSAGE");
    println!("{}", "-".repeat(90));
}

/// Formats a diagnostic as a table row.
pub fn format_diagnostic_row(diagnostic: &Diagnostic) -> String {
    format!(
        "{:<8} {:<6} {:<22} {}",
        format_position(diagnostic.position),
        diagnostic.tag.as_deref().unwrap_or("-"),
        truncate(&diagnostic.category, 22),
        diagnostic.message
    )
}

/// Prints the record listing header.
#[allow(clippy::print_literal)]
pub fn print_record_header() {
    println!("{:<8} {:<6} {:<5} {:<8} {}", "POSITION", "TAG", "LEVEL", "PARENT", "ERRORS");
    println!("{}", "-".repeat(40));
}

/// Prints the field table header of `efd schema TAG`.
#[allow(clippy::print_literal)]
pub fn print_field_header() {
    println!("{:<4} {:<18} {:<8} {:<8} {:<6} {}", "#", "FIELD", "KIND", "REQUIRED", "SCALE", "DESCRIPTION");
    println!("{}", "-".repeat(90));
}

/// Formats one field spec as a table row.
pub fn format_field_row(index: usize, field: &FieldSpec) -> String {
    let scale = field.scale.map_or_else(|| "-".to_string(), |s| s.to_string());
    format!(
        "{:<4} {:<18} {:<8} {:<8} {:<6} {}",
        index + 2,
        truncate(field.name.as_str(), 18),
        field.kind.to_string(),
        if field.required { "yes" } else { "no" },
        scale,
        truncate(&field.description, 50)
    )
}

/// Shortens `s` to `max_len` characters, marking the cut with `...`.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
