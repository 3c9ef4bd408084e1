//! Diagnostic stream splitting and endpoint resolution.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use bytes::Bytes;

use proxyctl_core::diag::{decode_record, resolve_endpoint, RecordScanner};


fn tokens(data: &[u8]) -> Vec<Bytes> {
    RecordScanner::new(data).map(|t| t.unwrap()).collect()
}

#[test]
fn empty_stream_yields_nothing() {
    assert!(tokens(b"").is_empty());
}

#[test]
fn single_record_includes_marker() {
    let rec = b"{\n    \"ID\":  \"ep1\"\n}";
    let out = tokens(rec);
    assert_eq!(out.len(), 1);
    assert_eq!(&out[0][..], &rec[..]);
}

#[test]
fn concatenated_records_split_exactly() {
    let records: Vec<String> = (0..5)
        .map(|i| format!("{{\n  \"ID\": \"ep{i}\",\n  \"Nested\": {{\n    \"k\": {i}\n  }}\n}}"))
        .collect();
    let stream = records.concat();

    let out = tokens(stream.as_bytes());
    assert_eq!(out.len(), records.len());
    for (tok, rec) in out.iter().zip(&records) {
        assert_eq!(&tok[..], rec.as_bytes());
    }
}

#[test]
fn trailing_fragment_is_dropped() {
    let stream = b"{\n \"ID\": \"a\"\n}{\n \"ID\": \"b\"\n}\n{\n \"ID\": \"trunc";
    let out = tokens(stream);
    assert_eq!(out.len(), 2);
    assert_eq!(decode_record(&out[1]).unwrap().id, "b");
}

#[test]
fn tool_sample_splits_into_endpoints() {
    let raw = vector_loader::read_bytes("hnsdiag_endpoints.txt");
    let ids: Vec<String> = tokens(&raw)
        .iter()
        .map(|t| decode_record(t).unwrap().id)
        .collect();
    assert_eq!(
        ids,
        vec![
            "9d1a5b0e-4b8e-4a56-a3c9-0b6c6f7e2a11",
            "4f2e7c11-0a9b-4d3c-8e7f-6a5b4c3d2e10",
            "77aa0c1d-3e2f-4b5a-9c8d-7e6f5a4b3c2d",
        ]
    );
}

#[test]
fn resolves_first_matching_endpoint() {
    let stream = concat!(
        "{\n\"ID\": \"ep1\", \"SharedContainers\": [\"c1\"]\n}",
        "{\n\"ID\": \"ep2\", \"SharedContainers\": [\"c2\", \"c3\"]\n}",
        "{\n\"ID\": \"ep3\", \"SharedContainers\": [\"c3\"]\n}",
    );
    let resolve = |id: &str| resolve_endpoint(id, RecordScanner::new(stream.as_bytes()));

    assert_eq!(resolve("c3").unwrap(), "ep2");
    assert_eq!(resolve("c1").unwrap(), "ep1");
    let err = resolve("c9").unwrap_err();
    assert_eq!(err.kind().as_str(), "NOT_FOUND");
    // Exact match only.
    assert_eq!(resolve("c").unwrap_err().kind().as_str(), "NOT_FOUND");
}

#[test]
fn resolves_against_tool_sample() {
    let raw = vector_loader::read_bytes("hnsdiag_endpoints.txt");
    let id = resolve_endpoint(
        "e3f1d2c4b5a6978877665544332211ffeeddccbbaa99887766554433221100aa",
        RecordScanner::new(&raw[..]),
    )
    .unwrap();
    assert_eq!(id, "4f2e7c11-0a9b-4d3c-8e7f-6a5b4c3d2e10");

    // Endpoint with `"SharedContainers": null` is scanned without error.
    let err = resolve_endpoint("missing", RecordScanner::new(&raw[..])).unwrap_err();
    assert_eq!(err.kind().as_str(), "NOT_FOUND");
}

#[test]
fn malformed_record_aborts_resolution() {
    let stream = concat!(
        "{\n\"ID\": \"ep1\", \"SharedContainers\": [\"c1\"]\n}",
        "{\n\"ID\": \"ep2\", \"SharedContainers\": [\"c2\",\n}",
        "{\n\"ID\": \"ep3\", \"SharedContainers\": [\"c3\"]\n}",
    );
    let err = resolve_endpoint("c3", RecordScanner::new(stream.as_bytes())).unwrap_err();
    assert_eq!(err.kind().as_str(), "SCHEMA");

    // A match before the bad record still wins.
    assert_eq!(resolve_endpoint("c1", RecordScanner::new(stream.as_bytes())).unwrap(), "ep1");
}
