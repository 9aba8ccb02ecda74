//! Validate command implementation.

use crate::input::{self, Assembly};
use crate::output::{
    diagnostics, format_diagnostic_row, format_position, print_diagnostic_header,
    print_record_header, Diagnostic,
};
use efd_document::Document;
use serde_json::json;

pub fn run(
    input_path: String,
    layout: Option<String>,
    json_output: bool,
    strict: bool,
    tag: Option<String>,
    errors_only: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = input::load(&input_path, layout.as_deref())?;
    let assembly = input::assemble(&input)?;
    let document = &assembly.document;

    let selected = |t: Option<&str>| tag.as_deref().map_or(true, |wanted| t == Some(wanted));
    let reported: Vec<Diagnostic> = diagnostics(&assembly)
        .into_iter()
        .filter(|d| selected(d.tag.as_deref()))
        .collect();

    if json_output {
        let records: Vec<_> = if errors_only {
            Vec::new()
        } else {
            listed_positions(document, &selected)
                .map(|position| {
                    let record = &document.records()[position];
                    json!({
                        "position": position,
                        "tag": record.tag(),
                        "level": record.level(),
                        "parent": document.parent(position),
                        "errors": record.errors().len(),
                    })
                })
                .collect()
        };
        let report = json!({
            "layout": input.layout,
            "checked_at": chrono::Utc::now().to_rfc3339(),
            "records": document.len(),
            "rejected": assembly.rejected.len(),
            "summary": document.summary(),
            "listing": records,
            "diagnostics": reported,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        if !errors_only {
            print_record_header();
            for position in listed_positions(document, &selected) {
                let record = &document.records()[position];
                println!(
                    "{:<8} {:<6} {:<5} {:<8} {}",
                    position,
                    record.tag().as_str(),
                    record.level(),
                    format_position(document.parent(position)),
                    record.errors().len()
                );
            }
            println!();
        }
        if reported.is_empty() {
            println!("No diagnostics ({} records, layout {})", document.len(), input.layout);
        } else {
            print_diagnostic_header();
            for diagnostic in &reported {
                println!("{}", format_diagnostic_row(diagnostic));
            }
            println!();
            print_totals(&assembly);
        }
    }

    if strict && assembly.diagnostic_count() > 0 {
        std::process::exit(1);
    }

    Ok(())
}

fn listed_positions<'a>(
    document: &'a Document,
    selected: &'a dyn Fn(Option<&str>) -> bool,
) -> impl Iterator<Item = usize> + 'a {
    document
        .records()
        .iter()
        .enumerate()
        .filter(move |(_, record)| selected(Some(record.tag().as_str())))
        .map(|(position, _)| position)
}

fn print_totals(assembly: &Assembly) {
    let summary = assembly.document.summary();
    println!("Status: {:?}", summary.status);
    for (category, count) in &summary.counts {
        println!("  {:<24} {}", format!("{:?}", category), count);
    }
    if !assembly.rejected.is_empty() {
        println!("  {:<24} {}", "UnknownRecordType", assembly.rejected.len());
    }
}
