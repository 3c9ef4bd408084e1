//! Shared error type across proxyctl crates.

use thiserror::Error;

/// Stable error categories, independent of the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Policy failed a precondition before any store interaction.
    Validation,
    /// Unknown endpoint, or no endpoint has the workload attached.
    NotFound,
    /// A structured payload could not be parsed into the expected schema.
    Schema,
    /// The diagnostic tool failed to run or broke its output contract.
    ExternalTool,
    /// The endpoint store rejected or failed a request.
    Store,
}

impl ErrorKind {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Schema => "SCHEMA",
            ErrorKind::ExternalTool => "EXTERNAL_TOOL",
            ErrorKind::Store => "STORE",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, ProxyCtlError>;

/// Unified error type used by core and host crates.
#[derive(Debug, Error)]
pub enum ProxyCtlError {
    #[error("invalid policy: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("external tool error: {0}")]
    ExternalTool(String),
    #[error("store error: {0}")]
    Store(String),
}

impl ProxyCtlError {
    /// Map the error to its stable category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProxyCtlError::Validation(_) => ErrorKind::Validation,
            ProxyCtlError::NotFound(_) => ErrorKind::NotFound,
            ProxyCtlError::Schema(_) => ErrorKind::Schema,
            ProxyCtlError::ExternalTool(_) => ErrorKind::ExternalTool,
            ProxyCtlError::Store(_) => ErrorKind::Store,
        }
    }
}
