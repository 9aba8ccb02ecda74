//! Integration tests for the efd binary.

use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn body() -> Vec<Value> {
    vec![
        json!({"reg": "0000", "fields": {
            "COD_VER": "017", "COD_FIN": "0", "DT_INI": "01012024", "DT_FIN": "31012024",
            "NOME": "EMPRESA TESTE LTDA", "CNPJ": "11222333000181", "UF": "SP",
            "IE": "123456789", "COD_MUN": "3550308", "IND_PERFIL": "A", "IND_ATIV": "1"
        }}),
        json!({"reg": "0001", "fields": {"IND_MOV": "0"}}),
        json!({"reg": "0990", "fields": {"QTD_LIN_0": 3}}),
        json!({"reg": "C001", "fields": {"IND_MOV": "0"}}),
        json!({"reg": "C100", "fields": {
            "IND_OPER": "0", "IND_EMIT": "1", "COD_MOD": "55", "COD_SIT": "00",
            "SER": "1", "NUM_DOC": "123", "DT_DOC": "05012024", "VL_DOC": "1500.5",
            "VL_ICMS": "180.06"
        }}),
        json!({"reg": "C170", "fields": {
            "NUM_ITEM": "1", "COD_ITEM": "P01", "QTD": "2", "VL_ITEM": "1500.50",
            "CST_ICMS": "000", "CFOP": "5102", "VL_BC_ICMS": "1500.50",
            "ALIQ_ICMS": "12", "VL_ICMS": "180.06"
        }}),
        json!({"reg": "C990", "fields": {"QTD_LIN_C": 4}}),
    ]
}

/// A complete ICMS/IPI file of 21 lines; `file_lines` overrides the 9999 count.
fn full_file(file_lines: u64) -> Vec<Value> {
    let mut records = body();
    records.push(json!({"reg": "9001", "fields": {"IND_MOV": "0"}}));
    for tag in ["0000", "0001", "0990", "C001", "C100", "C170", "C990", "9001", "9990", "9999"] {
        records.push(json!({"reg": "9900", "fields": {"REG_BLC": tag, "QTD_REG_BLC": 1}}));
    }
    records.push(json!({"reg": "9900", "fields": {"REG_BLC": "9900", "QTD_REG_BLC": 11}}));
    records.push(json!({"reg": "9990", "fields": {"QTD_LIN_9": 14}}));
    records.push(json!({"reg": "9999", "fields": {"QTD_LIN": file_lines}}));
    records
}

fn write_input(dir: &Path, name: &str, value: &Value) -> String {
    let path = dir.join(name);
    fs::write(&path, serde_json::to_vec_pretty(value).unwrap()).unwrap();
    path.to_string_lossy().to_string()
}

fn run_cli(args: &[&str]) -> (bool, String, String) {
    run_cli_with_env(args, &[])
}

fn run_cli_with_env(args: &[&str], env: &[(&str, &str)]) -> (bool, String, String) {
    let mut command = Command::new(env!("CARGO_BIN_EXE_efd"));
    command.args(args).env_remove("RUST_LOG").env_remove("EFD_LAYOUT");
    for (key, value) in env {
        command.env(key, value);
    }
    let output = command.output().expect("Failed to execute CLI");

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();
    let success = output.status.success();

    (success, stdout, stderr)
}

#[test]
fn test_validate_clean_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "in.json", &json!(full_file(21)));

    let (success, stdout, stderr) = run_cli(&["validate", &input, "--strict"]);
    assert!(success, "validate failed: {}", stderr);
    assert!(stdout.contains("POSITION"));
    assert!(stdout.contains("No diagnostics (21 records, layout icms-ipi)"));
}

#[test]
fn test_validate_json_reports_count_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "in.json", &json!(full_file(20)));

    let (success, stdout, _) = run_cli(&["validate", &input, "--json"]);
    assert!(success);

    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["records"], 21);
    assert_eq!(report["listing"].as_array().unwrap().len(), 21);
    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["category"], "StructuralViolation");
    assert_eq!(diagnostics[0]["position"], 20);
    assert_eq!(diagnostics[0]["tag"], "9999");
    assert_eq!(report["summary"]["status"], "Invalid");
}

#[test]
fn test_validate_strict_exits_nonzero() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "in.json", &json!(full_file(20)));

    let (success, stdout, _) = run_cli(&["validate", &input, "--strict", "--errors-only"]);
    assert!(!success);
    assert!(stdout.contains("declared 20, counted 21"));
    assert!(!stdout.contains("LEVEL"));
}

#[test]
fn test_validate_tag_filter_and_envelope() {
    let temp_dir = TempDir::new().unwrap();
    let mut records = full_file(21);
    records[5]["fields"]["VL_ICMS"] = json!("999.99");
    let envelope = json!({"layout": "icms-ipi", "records": records});
    let input = write_input(temp_dir.path(), "in.json", &envelope);

    let (success, stdout, _) = run_cli(&["validate", &input, "--tag", "C170", "--errors-only"]);
    assert!(success);
    assert!(stdout.contains("BusinessRuleViolation"));
    assert!(stdout.contains("C170"));
    assert!(!stdout.contains("C100 "));

    let (_, stdout, _) = run_cli(&["validate", &input, "--tag", "C100", "--errors-only"]);
    assert!(stdout.contains("No diagnostics"));
}

#[test]
fn test_validate_reports_unknown_register() {
    let temp_dir = TempDir::new().unwrap();
    let mut records = full_file(21);
    records.insert(3, json!({"reg": "Z999", "fields": {}}));
    let input = write_input(temp_dir.path(), "in.json", &json!(records));

    let (success, stdout, _) = run_cli(&["validate", &input, "--json", "--strict"]);
    assert!(!success);
    let report: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(report["rejected"], 1);
    let diagnostics = report["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0]["category"], "UnknownRecordType");
    assert_eq!(diagnostics[0]["position"], 3);
}

#[test]
fn test_validate_rejects_bad_input() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "in.json", &json!({"records": "nope"}));

    let (success, _, stderr) = run_cli(&["validate", &input]);
    assert!(!success);
    assert!(stderr.contains("Error:"));

    let (success, _, stderr) = run_cli(&["validate", "/nonexistent/in.json"]);
    assert!(!success);
    assert!(stderr.contains("failed to read"));

    let (success, _, stderr) = run_cli(&["validate", &input, "--layout", "ecd"]);
    assert!(!success);
    assert!(stderr.contains("Error:"));
}

#[test]
fn test_render_writes_file() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "in.json", &json!(full_file(21)));
    let output = temp_dir.path().join("efd.txt");
    let output = output.to_string_lossy().to_string();

    let (success, stdout, stderr) = run_cli(&["render", &input, "-o", &output]);
    assert!(success, "render failed: {}", stderr);
    assert!(stdout.contains("Wrote 21 lines"));
    assert!(stdout.contains("Digest: sha-256:"));

    let text = fs::read_to_string(&output).unwrap();
    assert!(text.starts_with("|0000|017|0|01012024|31012024|"));
    assert!(text.contains("|C990|4|\r\n"));
    assert!(text.ends_with("|9999|21|\r\n"));

    // Existing output is kept unless --force.
    let (success, _, stderr) = run_cli(&["render", &input, "-o", &output]);
    assert!(!success);
    assert!(stderr.contains("already exists"));
    let (success, _, _) = run_cli(&["render", &input, "-o", &output, "--force"]);
    assert!(success);
}

#[test]
fn test_render_refuses_diagnostics() {
    let temp_dir = TempDir::new().unwrap();
    let input = write_input(temp_dir.path(), "in.json", &json!(full_file(20)));
    let output = temp_dir.path().join("efd.txt");
    let output = output.to_string_lossy().to_string();

    let (success, _, stderr) = run_cli(&["render", &input, "-o", &output]);
    assert!(!success);
    assert!(stderr.contains("nothing written"));
    assert!(!Path::new(&output).exists());

    let (success, _, _) = run_cli(&["render", &input, "-o", &output, "--allow-errors"]);
    assert!(success);
    assert!(fs::read_to_string(&output).unwrap().ends_with("|9999|20|\r\n"));
}

#[test]
fn test_schema_listing_and_detail() {
    let (success, stdout, _) = run_cli(&["schema"]);
    assert!(success);
    assert!(stdout.contains("C100"));
    assert!(stdout.contains("registers in layout icms-ipi"));

    let (success, stdout, _) = run_cli(&["schema", "C170"]);
    assert!(success);
    assert!(stdout.contains("parent C100"));
    assert!(stdout.contains("VL_BC_ICMS"));
    assert!(stdout.contains("equality"));

    let (success, _, stderr) = run_cli(&["schema", "Z999"]);
    assert!(!success);
    assert!(stderr.contains("Z999"));
}

#[test]
fn test_schema_layout_from_env() {
    let (success, stdout, _) =
        run_cli_with_env(&["schema", "A170", "--json"], &[("EFD_LAYOUT", "contribuicoes")]);
    assert!(success);
    let schema: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(schema["tag"], "A170");
    assert!(!schema["rules"].as_array().unwrap().is_empty());

    let (success, _, _) = run_cli(&["schema", "A170"]);
    assert!(!success, "A170 is not an ICMS/IPI register");
}
