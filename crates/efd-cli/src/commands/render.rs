//! Render command implementation.

use crate::errors::CliError;
use crate::input;
use crate::output::{diagnostics, format_diagnostic_row};
use efd_document::{DocumentWriter, WriteOptions};

pub fn run(
    input_path: String,
    output: String,
    layout: Option<String>,
    allow_errors: bool,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let input = input::load(&input_path, layout.as_deref())?;
    let assembly = input::assemble(&input)?;

    let count = assembly.diagnostic_count();
    if count > 0 {
        for diagnostic in diagnostics(&assembly) {
            eprintln!("{}", format_diagnostic_row(&diagnostic));
        }
        if !allow_errors {
            return Err(CliError::Diagnostics(count).into());
        }
        eprintln!("Warning: writing {} despite {} diagnostic(s)", output, count);
    }

    let options = WriteOptions {
        sync: true,
        overwrite: force,
    };
    let mut writer = DocumentWriter::create(&output, options)
        .map_err(|e| format!("Failed to create {}: {}", output, e))?;
    writer.write_document(&assembly.document)?;
    let summary = writer.finish()?;

    println!("Wrote {} lines ({} bytes) to {}", summary.lines, summary.bytes, output);
    println!("Digest: {}", summary.digest);

    Ok(())
}
