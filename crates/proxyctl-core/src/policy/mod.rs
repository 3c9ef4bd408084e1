//! Layer-4 proxy policies and their HNS representation.
//!
//! - `model`: the caller-facing `Policy` and its validation rule.
//! - `wire`: the store's JSON schema (settings, envelopes, request bodies).
//! - `codec`: the mapping between the two.
//!
//! Callers validate, then encode. The store only ever sees `wire` types.

pub mod codec;
pub mod model;
pub mod wire;

pub use codec::{decode, encode, from_envelope, proxy_records, to_envelope};
pub use model::{Policy, Protocol, LOCAL_SYSTEM_SID};
pub use wire::{
    EndpointDescriptor, EndpointPolicyRecord, FiveTuple, ModifyEndpointSettingRequest,
    PolicyEndpointRequest, PolicyKind, ProxyType, RequestType, ResourceType, WireProxyPolicy,
};
