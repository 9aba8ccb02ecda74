//! Schema command implementation.

use crate::input::resolve_layout;
use crate::output::{format_field_row, print_field_header, truncate};
use efd_schemas::{CountDeclaration, RecordSchema, SchemaRegistry};
use serde_json::json;

pub fn run(
    tag: Option<String>,
    layout: Option<String>,
    json_output: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let layout = resolve_layout(layout.as_deref(), None)?;
    let registry = SchemaRegistry::builtin(layout);

    match tag {
        Some(tag) => {
            let schema = registry.get(&tag)?;
            if json_output {
                println!("{}", serde_json::to_string_pretty(schema.as_ref())?);
            } else {
                describe(&schema);
            }
        }
        None => {
            if json_output {
                let listing: Vec<_> = registry
                    .iter()
                    .map(|schema| {
                        json!({
                            "tag": schema.tag,
                            "level": schema.level,
                            "parent": schema.parent,
                            "fields": schema.fields.len(),
                            "description": schema.description,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                println!("{:<6} {:<5} {:<6} {}", "TAG", "LEVEL", "PARENT", "DESCRIPTION");
                println!("{}", "-".repeat(70));
                for schema in registry.iter() {
                    println!(
                        "{:<6} {:<5} {:<6} {}",
                        schema.tag.as_str(),
                        schema.level,
                        schema.parent.as_ref().map_or("-", |p| p.as_str()),
                        truncate(&schema.description, 60)
                    );
                }
                println!();
                println!("{} registers in layout {}", registry.len(), layout);
            }
        }
    }

    Ok(())
}

fn describe(schema: &RecordSchema) {
    println!("{} - {}", schema.tag, schema.description);
    println!(
        "Block {}, level {}, parent {}",
        schema.block(),
        schema.level,
        schema.parent.as_ref().map_or("-", |p| p.as_str())
    );
    println!();

    print_field_header();
    for (index, field) in schema.fields.iter().enumerate() {
        println!("{}", format_field_row(index, field));
    }

    if !schema.rules.is_empty() {
        println!();
        println!("Rules:");
        for rule in &schema.rules {
            let fields: Vec<&str> = rule.referenced_fields().iter().map(|f| f.as_str()).collect();
            println!("  {:<22} {}", rule.kind(), fields.join(", "));
        }
    }

    if let Some(count) = &schema.count {
        println!();
        match count {
            CountDeclaration::BlockLines { field } => {
                println!("Declares the line count of block {} in {}", schema.block(), field)
            }
            CountDeclaration::RegisterCount {
                register_field,
                count_field,
            } => println!(
                "Declares the count of register {} in {}",
                register_field, count_field
            ),
            CountDeclaration::FileLines { field } => {
                println!("Declares the file line count in {}", field)
            }
        }
    }
}
