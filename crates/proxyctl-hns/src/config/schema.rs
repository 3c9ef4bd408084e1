use serde::Deserialize;
use proxyctl_core::diag::DEFAULT_MAX_RECORD_BYTES;
use proxyctl_core::error::{ProxyCtlError, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyCtlConfig {
    pub version: u32,

    #[serde(default)]
    pub diagnostic: DiagnosticSection,
}

impl Default for ProxyCtlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            diagnostic: DiagnosticSection::default(),
        }
    }
}

impl ProxyCtlConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(ProxyCtlError::Validation(format!(
                "unsupported config version {}",
                self.version
            )));
        }

        self.diagnostic.validate()?;

        Ok(())
    }
}

/// How to invoke the endpoint diagnostic tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiagnosticSection {
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    #[serde(default = "default_max_record_bytes")]
    pub max_record_bytes: usize,
}

impl Default for DiagnosticSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            max_record_bytes: default_max_record_bytes(),
        }
    }
}

impl DiagnosticSection {
    pub fn validate(&self) -> Result<()> {
        if self.program.trim().is_empty() {
            return Err(ProxyCtlError::Validation(
                "diagnostic.program must not be empty".into(),
            ));
        }
        if !(1024..=64 * 1024 * 1024).contains(&self.max_record_bytes) {
            return Err(ProxyCtlError::Validation(
                "diagnostic.max_record_bytes must be between 1024 and 67108864".into(),
            ));
        }
        Ok(())
    }
}

fn default_program() -> String {
    "hnsdiag".into()
}
fn default_args() -> Vec<String> {
    vec!["list".into(), "endpoints".into(), "-df".into()]
}
fn default_max_record_bytes() -> usize {
    DEFAULT_MAX_RECORD_BYTES
}
