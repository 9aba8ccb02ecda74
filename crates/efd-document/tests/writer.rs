mod common;

use common::{assemble_all, full_file};
use efd_canonical::Digest;
use efd_document::{DocumentError, DocumentWriter, WriteOptions};
use std::fs;
use tempfile::TempDir;

#[test]
fn written_bytes_match_render_and_digest() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("efd.txt");
    let mut document = assemble_all(full_file(None));
    assert!(document.finish().is_empty());

    let mut writer = DocumentWriter::create(&path, WriteOptions::default()).unwrap();
    let summary = writer.write_document(&document).unwrap();
    let finished = writer.finish().unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes, document.render().into_bytes());
    assert_eq!(summary, finished);
    assert_eq!(summary.lines, 21);
    assert_eq!(summary.bytes, bytes.len() as u64);
    assert_eq!(summary.digest, Digest::sha256(&bytes));
}

#[test]
fn existing_file_is_not_clobbered_by_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("efd.txt");
    fs::write(&path, b"keep").unwrap();

    let result = DocumentWriter::create(&path, WriteOptions::default());
    assert!(matches!(result, Err(DocumentError::FileExists(_))));
    assert_eq!(fs::read(&path).unwrap(), b"keep");
}

#[test]
fn overwrite_replaces_existing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("efd.txt");
    fs::write(&path, vec![b'x'; 10_000]).unwrap();

    let document = assemble_all(full_file(None));
    let options = WriteOptions {
        sync: true,
        overwrite: true,
    };
    let mut writer = DocumentWriter::create(&path, options).unwrap();
    writer.write_document(&document).unwrap();
    writer.finish().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), document.render());
}

#[test]
fn empty_document_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("empty.txt");

    let writer = DocumentWriter::create(&path, WriteOptions::default()).unwrap();
    let summary = writer.finish().unwrap();

    assert_eq!(summary.lines, 0);
    assert_eq!(summary.digest, Digest::sha256(b""));
    assert!(fs::read(&path).unwrap().is_empty());
}
