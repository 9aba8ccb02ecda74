//! Document writer implementation.

use crate::document::Document;
use crate::errors::DocumentError;
use efd_canonical::{Digest, Sha256Stream};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Options for document writing.
#[derive(Debug, Clone, Default)]
pub struct WriteOptions {
    /// Whether to fsync when finishing (default: false).
    pub sync: bool,
    /// Whether to replace an existing file (default: false).
    pub overwrite: bool,
}

/// What a writer has produced so far.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSummary {
    /// Lines written.
    pub lines: u64,
    /// Bytes written.
    pub bytes: u64,
    /// SHA-256 of the bytes written.
    pub digest: Digest,
}

/// Writes rendered EFD documents to a file.
///
/// # Example
///
/// ```rust,no_run
/// use efd_document::{Document, DocumentWriter, WriteOptions};
///
/// let document = Document::default();
/// let mut writer = DocumentWriter::create("efd.txt", WriteOptions::default())?;
/// let summary = writer.write_document(&document)?;
/// writer.finish()?;
/// println!("{} lines, {}", summary.lines, summary.digest);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct DocumentWriter {
    file: BufWriter<File>,
    sync: bool,
    lines: u64,
    bytes: u64,
    hasher: Sha256Stream,
}

impl DocumentWriter {
    /// Creates the target file.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::FileExists`] if the file exists and
    /// `options.overwrite` is `false`, or an I/O error.
    pub fn create<P: AsRef<Path>>(path: P, options: WriteOptions) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let mut open = OpenOptions::new();
        open.write(true);
        if options.overwrite {
            open.create(true).truncate(true);
        } else {
            open.create_new(true);
        }
        let file = open.open(path).map_err(|err| match err.kind() {
            io::ErrorKind::AlreadyExists => DocumentError::FileExists(path.display().to_string()),
            _ => DocumentError::Io(err),
        })?;

        Ok(Self {
            file: BufWriter::new(file),
            sync: options.sync,
            lines: 0,
            bytes: 0,
            hasher: Sha256Stream::new(),
        })
    }

    /// Writes every line of `document` and returns the running totals.
    pub fn write_document(&mut self, document: &Document) -> Result<WriteSummary, DocumentError> {
        for (line, terminator) in document.terminated_lines() {
            self.write_line(&line, terminator)?;
        }
        self.file.flush()?;
        let summary = self.summary();
        info!(
            lines = summary.lines,
            bytes = summary.bytes,
            digest = %summary.digest,
            "document written"
        );
        Ok(summary)
    }

    fn write_line(&mut self, line: &str, terminator: &str) -> Result<(), DocumentError> {
        for part in [line.as_bytes(), terminator.as_bytes()] {
            self.file.write_all(part)?;
            self.hasher.push(part);
            self.bytes += part.len() as u64;
        }
        self.lines += 1;
        Ok(())
    }

    /// Totals of everything written so far.
    pub fn summary(&self) -> WriteSummary {
        WriteSummary {
            lines: self.lines,
            bytes: self.bytes,
            digest: self.hasher.clone().finish(),
        }
    }

    /// Flushes, optionally syncs, and closes the file.
    pub fn finish(mut self) -> Result<WriteSummary, DocumentError> {
        self.file.flush()?;
        if self.sync {
            self.file.get_ref().sync_all()?;
        }
        Ok(self.summary())
    }
}

impl Drop for DocumentWriter {
    fn drop(&mut self) {
        let _ = self.file.flush();
        if self.sync {
            let _ = self.file.get_ref().sync_all();
        }
    }
}
