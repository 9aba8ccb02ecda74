#![allow(dead_code)]

use efd_canonical::RawFields;
use efd_core::{CanonicalRecord, Engine};
use efd_document::Document;
use efd_schemas::Layout;
use serde_json::{json, Value};

pub fn engine() -> Engine {
    Engine::builtin(Layout::IcmsIpi)
}

pub fn record(tag: &str, fields: Value) -> CanonicalRecord {
    let raw: RawFields = serde_json::from_value(fields).unwrap();
    engine().standardize_and_validate(tag, &raw).unwrap()
}

/// Registers of a small but complete ICMS/IPI file, without block 9.
pub fn body() -> Vec<CanonicalRecord> {
    vec![
        record(
            "0000",
            json!({
                "COD_VER": "017", "COD_FIN": "0", "DT_INI": "01012024", "DT_FIN": "31012024",
                "NOME": "EMPRESA TESTE LTDA", "CNPJ": "11222333000181", "UF": "SP",
                "IE": "123456789", "COD_MUN": "3550308", "IND_PERFIL": "A", "IND_ATIV": "1"
            }),
        ),
        record("0001", json!({"IND_MOV": "0"})),
        record("0990", json!({"QTD_LIN_0": 3})),
        record("C001", json!({"IND_MOV": "0"})),
        record(
            "C100",
            json!({
                "IND_OPER": "0", "IND_EMIT": "1", "COD_MOD": "55", "COD_SIT": "00",
                "SER": "1", "NUM_DOC": "123", "DT_DOC": "05012024", "VL_DOC": "1500.5",
                "VL_ICMS": "180.06"
            }),
        ),
        record(
            "C170",
            json!({
                "NUM_ITEM": "1", "COD_ITEM": "P01", "QTD": "2", "VL_ITEM": "1500.50",
                "CST_ICMS": "000", "CFOP": "5102", "VL_BC_ICMS": "1500.50",
                "ALIQ_ICMS": "12", "VL_ICMS": "180.06"
            }),
        ),
        record("C990", json!({"QTD_LIN_C": 4})),
    ]
}

/// Block 9 declaring `body` plus itself; `file_lines` overrides the 9999 count.
pub fn trailer(body: &[CanonicalRecord], file_lines: Option<u64>) -> Vec<CanonicalRecord> {
    let mut tags: Vec<String> = Vec::new();
    for record in body {
        let tag = record.tag().to_string();
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    }
    let count = |tag: &str| body.iter().filter(|r| r.tag().as_str() == tag).count() as u64;
    let mut declared: Vec<(String, u64)> = tags.iter().map(|t| (t.clone(), count(t))).collect();
    for tag in ["9001", "9990", "9999"] {
        declared.push((tag.to_string(), 1));
    }
    let registers_9900 = declared.len() as u64 + 1;
    declared.push(("9900".to_string(), registers_9900));

    let block_9_lines = registers_9900 + 3;
    let total = body.len() as u64 + block_9_lines;

    let mut out = vec![record("9001", json!({"IND_MOV": "0"}))];
    for (tag, n) in declared {
        out.push(record("9900", json!({"REG_BLC": tag, "QTD_REG_BLC": n})));
    }
    out.push(record("9990", json!({"QTD_LIN_9": block_9_lines})));
    out.push(record(
        "9999",
        json!({"QTD_LIN": file_lines.unwrap_or(total)}),
    ));
    out
}

pub fn full_file(file_lines: Option<u64>) -> Vec<CanonicalRecord> {
    let mut records = body();
    let trailer = trailer(&records, file_lines);
    records.extend(trailer);
    records
}

pub fn assemble_all(records: Vec<CanonicalRecord>) -> Document {
    let mut document = Document::default();
    for record in records {
        document.assemble(record);
    }
    document
}
