//! In-process endpoint store.

use std::collections::HashMap;
use std::sync::Mutex;

use proxyctl_core::error::{ProxyCtlError, Result};
use proxyctl_core::policy::{
    EndpointDescriptor, EndpointPolicyRecord, ModifyEndpointSettingRequest, RequestType,
};

use super::EndpointPolicyStore;

/// Endpoint store held in memory, keyed by exact endpoint ID.
#[derive(Debug, Default)]
pub struct MemoryStore {
    endpoints: Mutex<HashMap<String, Vec<EndpointPolicyRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create or replace an endpoint with the given policies.
    pub fn insert_endpoint(
        &self,
        endpoint_id: impl Into<String>,
        policies: Vec<EndpointPolicyRecord>,
    ) -> Result<()> {
        self.with_endpoints(|eps| {
            eps.insert(endpoint_id.into(), policies);
            Ok(())
        })
    }

    fn with_endpoints<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Vec<EndpointPolicyRecord>>) -> Result<T>,
    ) -> Result<T> {
        // Poisoned mutex means a writer panicked; refuse rather than serve half-applied state.
        let mut guard = self
            .endpoints
            .lock()
            .map_err(|_| ProxyCtlError::Store("memory store lock poisoned".into()))?;
        f(&mut guard)
    }
}

impl EndpointPolicyStore for MemoryStore {
    fn get_by_id(&self, endpoint_id: &str) -> Result<EndpointDescriptor> {
        self.with_endpoints(|eps| {
            let policies = eps
                .get(endpoint_id)
                .ok_or_else(|| ProxyCtlError::NotFound(format!("endpoint {endpoint_id}")))?;
            Ok(EndpointDescriptor {
                id: endpoint_id.to_string(),
                policies: policies.clone(),
            })
        })
    }

    fn modify_settings(
        &self,
        endpoint_id: &str,
        request: &ModifyEndpointSettingRequest,
    ) -> Result<()> {
        let req = request
            .policy_request()
            .map_err(|e| ProxyCtlError::Store(format!("rejected modify request: {e}")))?;

        self.with_endpoints(|eps| {
            let current = eps
                .get_mut(endpoint_id)
                .ok_or_else(|| ProxyCtlError::NotFound(format!("endpoint {endpoint_id}")))?;

            match request.request_type {
                RequestType::Add => current.extend(req.policies),
                RequestType::Remove => {
                    for p in &req.policies {
                        match current.iter().position(|c| c == p) {
                            Some(i) => {
                                current.remove(i);
                            }
                            None => {
                                tracing::debug!(
                                    endpoint_id,
                                    kind = %p.kind,
                                    "remove: policy already gone"
                                );
                            }
                        }
                    }
                }
            }
            Ok(())
        })
    }
}
