//! Input loading and document assembly shared by the commands.

use crate::errors::CliError;
use efd_canonical::RawRecord;
use efd_core::{CoreError, Engine};
use efd_document::Document;
use efd_schemas::Layout;
use serde::Deserialize;
use std::fs;
use tracing::warn;

#[derive(Deserialize)]
#[serde(untagged)]
enum InputFile {
    Records(Vec<RawRecord>),
    Envelope {
        #[serde(default)]
        layout: Option<Layout>,
        records: Vec<RawRecord>,
    },
}

/// Records read from an input file, with the layout they are checked against.
pub struct Input {
    pub layout: Layout,
    pub records: Vec<RawRecord>,
}

/// Input record whose tag is not part of the layout.
pub struct Rejected {
    /// Zero-based index in the input list.
    pub index: usize,
    pub tag: String,
}

/// Finished document plus the input records that never reached it.
pub struct Assembly {
    pub document: Document,
    pub rejected: Vec<Rejected>,
}

impl Assembly {
    /// Record errors, structural violations and rejected inputs together.
    pub fn diagnostic_count(&self) -> u64 {
        self.document.summary().total() + self.rejected.len() as u64
    }
}

/// Resolves a layout name; a flag (or `EFD_LAYOUT`) wins over the file's own.
pub fn resolve_layout(flag: Option<&str>, declared: Option<Layout>) -> Result<Layout, Box<dyn std::error::Error>> {
    match flag {
        Some(name) => Ok(name.parse::<Layout>()?),
        None => Ok(declared.unwrap_or(Layout::IcmsIpi)),
    }
}

/// Reads `[{"reg", "fields"}]` or `{"layout", "records"}` from `path`.
pub fn load(path: &str, layout: Option<&str>) -> Result<Input, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_string(),
        source,
    })?;
    let file: InputFile = serde_json::from_str(&text).map_err(|source| CliError::Parse {
        path: path.to_string(),
        source,
    })?;

    let (declared, records) = match file {
        InputFile::Records(records) => (None, records),
        InputFile::Envelope { layout, records } => (layout, records),
    };
    Ok(Input {
        layout: resolve_layout(layout, declared)?,
        records,
    })
}

/// Runs every record through the engine and the assembler, then finishes.
pub fn assemble(input: &Input) -> Result<Assembly, CoreError> {
    let engine = Engine::builtin(input.layout);
    let mut document = Document::default();
    let mut rejected = Vec::new();

    for (index, raw) in input.records.iter().enumerate() {
        match engine.build(raw) {
            Ok(record) => {
                document.assemble(record);
            }
            Err(CoreError::UnknownRecordType(tag)) => {
                warn!(index, tag = %tag, "unknown register type skipped");
                rejected.push(Rejected { index, tag });
            }
            Err(err) => return Err(err),
        }
    }
    document.finish();

    Ok(Assembly { document, rejected })
}
