//! Endpoint diagnostic output parsing.
//!
//! The diagnostic tool prints one JSON object per endpoint, back to back,
//! with no enclosing array and no separators. `scanner` splits that stream
//! into per-record tokens; `resolver` decodes them and finds the endpoint a
//! workload is attached to.

pub mod resolver;
pub mod scanner;

pub use resolver::{decode_record, resolve_endpoint, DiagnosticRecord};
pub use scanner::{RecordScanner, DEFAULT_MAX_RECORD_BYTES, RECORD_TERMINATOR};
