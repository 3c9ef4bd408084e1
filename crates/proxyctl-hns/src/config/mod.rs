//! proxyctl config loader (strict parsing).

pub mod schema;

use std::fs;
use std::path::Path;

use proxyctl_core::error::{ProxyCtlError, Result};

pub use schema::{DiagnosticSection, ProxyCtlConfig};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<ProxyCtlConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path).map_err(|e| {
        ProxyCtlError::Validation(format!("read config {} failed: {e}", path.display()))
    })?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ProxyCtlConfig> {
    let cfg: ProxyCtlConfig = serde_yaml::from_str(s)
        .map_err(|e| ProxyCtlError::Validation(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
