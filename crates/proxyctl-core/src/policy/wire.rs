//! HNS wire schema for endpoint policies.
//!
//! Field names and encodings follow the store's JSON contract. Port and
//! protocol are decimal strings on the wire and must stay that way.
//! Settings payloads are kept as `RawValue` until a caller asks for them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::{ProxyCtlError, Result};

/// Which proxy driver enforces the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProxyType(pub u8);

impl ProxyType {
    pub const VFP: ProxyType = ProxyType(0);
    pub const WFP: ProxyType = ProxyType(1);
}

/// Traffic selector. Every field is always serialized; unset filters are
/// empty strings, never omitted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FiveTuple {
    #[serde(default)]
    pub local_addresses: String,
    #[serde(default)]
    pub remote_addresses: String,
    /// Protocol number as a decimal string.
    #[serde(default)]
    pub protocols: String,
    #[serde(default)]
    pub priority: u16,
}

/// Settings payload of an `L4Proxy` endpoint policy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WireProxyPolicy {
    #[serde(default)]
    pub proxy_type: ProxyType,
    /// Proxy port as a decimal string.
    #[serde(default)]
    pub port: String,
    #[serde(rename = "UserSID", default)]
    pub user_sid: String,
    #[serde(rename = "CompartmentID", default)]
    pub compartment_id: u32,
    #[serde(default)]
    pub filter_tuple: FiveTuple,
}

/// Type tag of an endpoint policy record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PolicyKind {
    L4Proxy,
    /// Any other policy type the store holds (ACL, OutBoundNAT, ...).
    Other(String),
}

impl PolicyKind {
    pub fn as_str(&self) -> &str {
        match self {
            PolicyKind::L4Proxy => "L4Proxy",
            PolicyKind::Other(s) => s,
        }
    }
}

impl From<String> for PolicyKind {
    fn from(s: String) -> Self {
        if s == "L4Proxy" {
            PolicyKind::L4Proxy
        } else {
            PolicyKind::Other(s)
        }
    }
}

impl From<PolicyKind> for String {
    fn from(k: PolicyKind) -> Self {
        match k {
            PolicyKind::L4Proxy => "L4Proxy".into(),
            PolicyKind::Other(s) => s,
        }
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Store-level policy envelope: type tag + opaque settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointPolicyRecord {
    #[serde(rename = "Type")]
    pub kind: PolicyKind,
    #[serde(rename = "Settings", default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Box<RawValue>>,
}

impl EndpointPolicyRecord {
    pub fn is_proxy(&self) -> bool {
        self.kind == PolicyKind::L4Proxy
    }

    /// Raw settings text, empty when the record carries none.
    pub fn settings_json(&self) -> &str {
        self.settings.as_deref().map(RawValue::get).unwrap_or("")
    }
}

// RawValue has no PartialEq; records compare by tag and settings text.
impl PartialEq for EndpointPolicyRecord {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.settings_json() == other.settings_json()
    }
}

/// Endpoint properties as reported by the store. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointDescriptor {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Policies", default)]
    pub policies: Vec<EndpointPolicyRecord>,
}

/// List of policies to add to or remove from an endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyEndpointRequest {
    #[serde(rename = "Policies", default)]
    pub policies: Vec<EndpointPolicyRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Add,
    Remove,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceType {
    Policy,
}

/// Body of an endpoint modify call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModifyEndpointSettingRequest {
    pub resource_type: ResourceType,
    pub request_type: RequestType,
    pub settings: Box<RawValue>,
}

impl ModifyEndpointSettingRequest {
    /// Wrap a policy list into a modify request.
    pub fn policies(request_type: RequestType, request: &PolicyEndpointRequest) -> Result<Self> {
        let settings = serde_json::value::to_raw_value(request)
            .map_err(|e| ProxyCtlError::Schema(format!("encode policy request failed: {e}")))?;
        Ok(Self {
            resource_type: ResourceType::Policy,
            request_type,
            settings,
        })
    }

    /// Parse the settings back into a policy list.
    pub fn policy_request(&self) -> Result<PolicyEndpointRequest> {
        serde_json::from_str(self.settings.get())
            .map_err(|e| ProxyCtlError::Schema(format!("invalid policy request settings: {e}")))
    }
}
