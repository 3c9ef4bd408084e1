//! Caller-facing proxy policy operations.
//!
//! Each call goes straight to the store or the diagnostic tool; nothing is
//! cached between calls.

use proxyctl_core::diag::{resolve_endpoint, RecordScanner};
use proxyctl_core::error::Result;
use proxyctl_core::policy::{
    decode, encode, from_envelope, proxy_records, to_envelope, EndpointPolicyRecord,
    ModifyEndpointSettingRequest, Policy, PolicyEndpointRequest, RequestType,
};

use crate::hnsdiag::DiagnosticSource;
use crate::store::EndpointPolicyStore;

/// Add a layer-4 proxy policy to an endpoint.
///
/// The policy is validated before the store is contacted.
pub fn add_policy(
    store: &dyn EndpointPolicyStore,
    endpoint_id: &str,
    policy: &Policy,
) -> Result<()> {
    policy.validate()?;

    let record = to_envelope(&encode(policy))?;
    let request = PolicyEndpointRequest {
        policies: vec![record],
    };

    store.get_by_id(endpoint_id)?;
    store.apply_policy(endpoint_id, RequestType::Add, &request)?;

    tracing::info!(
        endpoint_id,
        port = policy.proxy_port,
        priority = policy.priority,
        "proxy policy added"
    );
    Ok(())
}

/// Proxy policies currently active on an endpoint, in store order.
pub fn list_policies(store: &dyn EndpointPolicyStore, endpoint_id: &str) -> Result<Vec<Policy>> {
    active_proxy_records(store, endpoint_id)?
        .iter()
        .map(|r| from_envelope(r).map(|wire| decode(&wire)))
        .collect()
}

/// Remove every proxy policy from an endpoint and return how many went.
/// Policies of other kinds are left alone.
///
/// This is list-then-remove with no compare-and-swap. A policy another caller
/// adds after the list survives the clear, and a policy removed concurrently
/// is still requested for removal (and counted).
pub fn clear_policies(store: &dyn EndpointPolicyStore, endpoint_id: &str) -> Result<usize> {
    let policies = active_proxy_records(store, endpoint_id)?;
    let removed = policies.len();
    if removed == 0 {
        tracing::debug!(endpoint_id, "no proxy policies to clear");
        return Ok(0);
    }

    let modify = ModifyEndpointSettingRequest::policies(
        RequestType::Remove,
        &PolicyEndpointRequest { policies },
    )?;
    store.modify_settings(endpoint_id, &modify)?;

    tracing::info!(endpoint_id, removed, "proxy policies cleared");
    Ok(removed)
}

/// ID of the endpoint the given container is attached to.
///
/// Runs the diagnostic tool once and scans its whole output. The container
/// ID itself is not checked against any runtime.
pub fn lookup_endpoint(source: &dyn DiagnosticSource, container_id: &str) -> Result<String> {
    let output = source.capture()?;
    let scanner = RecordScanner::with_limit(&output[..], source.max_record_bytes());
    let endpoint_id = resolve_endpoint(container_id, scanner)?;
    tracing::info!(container_id, endpoint_id = %endpoint_id, "container endpoint resolved");
    Ok(endpoint_id)
}

fn active_proxy_records(
    store: &dyn EndpointPolicyStore,
    endpoint_id: &str,
) -> Result<Vec<EndpointPolicyRecord>> {
    let endpoint = store.get_by_id(endpoint_id)?;
    Ok(proxy_records(&endpoint.policies))
}
