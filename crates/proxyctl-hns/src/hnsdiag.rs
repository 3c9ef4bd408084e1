//! `hnsdiag` invocation.
//!
//! The tool is run to completion and its full stdout handed to the record
//! scanner. There is no timeout: a hung tool hangs the lookup.

use std::process::{Command, Stdio};

use proxyctl_core::diag::DEFAULT_MAX_RECORD_BYTES;
use proxyctl_core::error::{ProxyCtlError, Result};

use crate::config::DiagnosticSection;

/// Producer of endpoint diagnostic output.
pub trait DiagnosticSource {
    /// Run the diagnostic and return everything it printed.
    fn capture(&self) -> Result<Vec<u8>>;

    /// Upper bound on one unterminated record in the captured output.
    fn max_record_bytes(&self) -> usize {
        DEFAULT_MAX_RECORD_BYTES
    }
}

/// The `hnsdiag` command line tool (or any program with the same output).
#[derive(Debug, Clone)]
pub struct HnsDiag {
    program: String,
    args: Vec<String>,
    max_record_bytes: usize,
}

impl HnsDiag {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            max_record_bytes: DEFAULT_MAX_RECORD_BYTES,
        }
    }

    pub fn from_config(cfg: &DiagnosticSection) -> Self {
        Self {
            program: cfg.program.clone(),
            args: cfg.args.clone(),
            max_record_bytes: cfg.max_record_bytes,
        }
    }
}

impl Default for HnsDiag {
    fn default() -> Self {
        Self::from_config(&DiagnosticSection::default())
    }
}

impl DiagnosticSource for HnsDiag {
    fn capture(&self) -> Result<Vec<u8>> {
        tracing::debug!(program = %self.program, args = ?self.args, "running diagnostic tool");

        let output = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                ProxyCtlError::ExternalTool(format!("failed to run {}: {e}", self.program))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProxyCtlError::ExternalTool(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        tracing::debug!(bytes = output.stdout.len(), "diagnostic output captured");
        Ok(output.stdout)
    }

    fn max_record_bytes(&self) -> usize {
        self.max_record_bytes
    }
}
