//! Container -> endpoint lookup through a diagnostic source.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use proxyctl_core::error::{ProxyCtlError, Result};
use proxyctl_hns::hnsdiag::{DiagnosticSource, HnsDiag};
use proxyctl_hns::ops;

/// Pre-captured tool output.
struct Captured {
    out: Vec<u8>,
    max_record_bytes: usize,
}

impl Captured {
    fn sample() -> Self {
        Self {
            out: fs::read("tests/vectors/hnsdiag_endpoints.txt").unwrap(),
            max_record_bytes: 1024 * 1024,
        }
    }
}

impl DiagnosticSource for Captured {
    fn capture(&self) -> Result<Vec<u8>> {
        Ok(self.out.clone())
    }

    fn max_record_bytes(&self) -> usize {
        self.max_record_bytes
    }
}

struct Failing;

impl DiagnosticSource for Failing {
    fn capture(&self) -> Result<Vec<u8>> {
        Err(ProxyCtlError::ExternalTool("hnsdiag exited with exit code: 1".into()))
    }
}

#[test]
fn resolves_attached_container() {
    let src = Captured::sample();
    let id = ops::lookup_endpoint(
        &src,
        "0f3c9b3a0d2e6c1b4a5f7e8d9c0b1a2f3e4d5c6b7a8f9e0d1c2b3a4f5e6d7c8b",
    )
    .unwrap();
    assert_eq!(id, "9d1a5b0e-4b8e-4a56-a3c9-0b6c6f7e2a11");
}

#[test]
fn unattached_container_is_not_found() {
    let err = ops::lookup_endpoint(&Captured::sample(), "c9").unwrap_err();
    assert_eq!(err.kind().as_str(), "NOT_FOUND");
}

#[test]
fn record_over_limit_is_external_tool_error() {
    let src = Captured { max_record_bytes: 64, ..Captured::sample() };
    let err = ops::lookup_endpoint(&src, "c9").unwrap_err();
    assert_eq!(err.kind().as_str(), "EXTERNAL_TOOL");
}

#[test]
fn tool_failure_is_surfaced() {
    let err = ops::lookup_endpoint(&Failing, "c1").unwrap_err();
    assert_eq!(err.kind().as_str(), "EXTERNAL_TOOL");
}

#[test]
fn missing_program_is_external_tool_error() {
    let tool = HnsDiag::new("proxyctl-no-such-diagnostic-tool", vec![]);
    let err = tool.capture().unwrap_err();
    assert_eq!(err.kind().as_str(), "EXTERNAL_TOOL");
    assert!(err.to_string().contains("proxyctl-no-such-diagnostic-tool"));
}

#[cfg(unix)]
#[test]
fn runs_tool_and_scans_stdout() {
    let tool = HnsDiag::new(
        "sh",
        vec!["-c".into(), "cat tests/vectors/hnsdiag_endpoints.txt".into()],
    );
    let id = ops::lookup_endpoint(
        &tool,
        "a1b2c3d4e5f60718293a4b5c6d7e8f90a1b2c3d4e5f60718293a4b5c6d7e8f90",
    )
    .unwrap();
    assert_eq!(id, "4f2e7c11-0a9b-4d3c-8e7f-6a5b4c3d2e10");
}

#[cfg(unix)]
#[test]
fn nonzero_exit_carries_stderr() {
    let tool = HnsDiag::new("sh", vec!["-c".into(), "echo 'HNS unavailable' >&2; exit 3".into()]);
    let err = tool.capture().unwrap_err();
    assert_eq!(err.kind().as_str(), "EXTERNAL_TOOL");
    assert!(err.to_string().contains("HNS unavailable"), "{err}");
}
