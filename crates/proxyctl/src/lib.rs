//! Top-level facade crate for proxyctl.
//!
//! Re-exports the core codec/scanner types and the HNS host integration so
//! users can depend on a single crate.

pub mod core {
    pub use proxyctl_core::*;
}

pub mod hns {
    pub use proxyctl_hns::*;
}

pub use proxyctl_core::{Policy, ProxyCtlError, Result};
pub use proxyctl_hns::ops::{add_policy, clear_policies, list_policies, lookup_endpoint};
