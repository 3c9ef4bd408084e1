//! Workload -> endpoint resolution over diagnostic records.

use bytes::Bytes;
use serde::Deserialize;

use crate::error::{ProxyCtlError, Result};

/// One endpoint as printed by the diagnostic tool. Other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiagnosticRecord {
    #[serde(rename = "ID")]
    pub id: String,
    /// Workloads attached to the endpoint, in tool order. `null` means none.
    #[serde(rename = "SharedContainers", default)]
    shared_containers: Option<Vec<String>>,
}

impl DiagnosticRecord {
    pub fn new(id: impl Into<String>, attached: Vec<String>) -> Self {
        Self {
            id: id.into(),
            shared_containers: Some(attached),
        }
    }

    pub fn attached(&self) -> &[String] {
        self.shared_containers.as_deref().unwrap_or(&[])
    }

    pub fn is_attached(&self, workload_id: &str) -> bool {
        self.attached().iter().any(|w| w == workload_id)
    }
}

/// Decode one scanner token. The tool's output is trusted, so a bad token
/// is a contract violation and fails loudly.
pub fn decode_record(token: &[u8]) -> Result<DiagnosticRecord> {
    serde_json::from_slice(token)
        .map_err(|e| ProxyCtlError::Schema(format!("invalid diagnostic record: {e}")))
}

/// Return the ID of the first endpoint, in stream order, that lists
/// `workload_id` among its attachments.
///
/// Tokens after the match are not read. Any scanner or decode error aborts
/// the whole resolution. When several endpoints list the same workload the
/// first one wins; the tool does not promise a stable order across runs.
pub fn resolve_endpoint<I>(workload_id: &str, tokens: I) -> Result<String>
where
    I: IntoIterator<Item = Result<Bytes>>,
{
    let mut scanned = 0usize;
    for token in tokens {
        let record = decode_record(&token?)?;
        scanned += 1;
        if record.is_attached(workload_id) {
            tracing::debug!(workload_id, endpoint_id = %record.id, scanned, "workload resolved");
            return Ok(record.id);
        }
    }
    tracing::debug!(workload_id, scanned, "no endpoint lists workload");
    Err(ProxyCtlError::NotFound(format!(
        "could not find an endpoint attached to container {workload_id}"
    )))
}
