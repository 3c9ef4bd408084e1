use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::error::{ProxyCtlError, Result};

/// SID of the "Local System" account.
///
/// Sidecar proxies usually run under this principal. Setting it as
/// `Policy::user_sid` keeps the proxy's own outbound traffic from being
/// redirected back into the proxy.
pub const LOCAL_SYSTEM_SID: &str = "S-1-5-18";

/// IANA protocol number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Protocol(pub u8);

impl Protocol {
    /// The only protocol the proxy driver supports.
    pub const TCP: Protocol = Protocol(6);
}

impl Default for Protocol {
    fn default() -> Self {
        Protocol::TCP
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A proxy and the traffic that should be redirected to it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Policy {
    /// Port the proxy listens on. Required, must be nonzero.
    pub proxy_port: u16,
    /// Traffic originating from this user SID is not redirected. Empty means unset.
    #[serde(default)]
    pub user_sid: String,
    /// Only redirect traffic from this network compartment. Zero means unset.
    #[serde(default)]
    pub compartment_id: u32,
    /// Only redirect traffic originating from this address.
    #[serde(default)]
    pub local_addr: Option<IpAddr>,
    /// Only redirect traffic destined to this address.
    #[serde(default)]
    pub remote_addr: Option<IpAddr>,
    /// Filter weight used to order overlapping rules.
    #[serde(default)]
    pub priority: u8,
    /// Always rewritten to `Protocol::TCP` when encoded.
    #[serde(default)]
    pub protocol: Protocol,
}

impl Policy {
    /// Proxy everything on `proxy_port` with default filters.
    pub fn new(proxy_port: u16) -> Self {
        Self {
            proxy_port,
            ..Self::default()
        }
    }

    /// Check the preconditions for handing the policy to the store.
    ///
    /// Only the port is checked; field widths already bound the rest.
    pub fn validate(&self) -> Result<()> {
        if self.proxy_port == 0 {
            return Err(ProxyCtlError::Validation(
                "policy has invalid proxy port number 0".into(),
            ));
        }
        Ok(())
    }
}
