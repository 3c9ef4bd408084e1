//! Endpoint policy store seam.
//!
//! The store is the system of record for endpoint policies. `HcnStore` talks
//! to the Host Networking Service; `MemoryStore` keeps everything in process.

pub mod hcn;
pub mod memory;

use proxyctl_core::error::Result;
use proxyctl_core::policy::{
    EndpointDescriptor, ModifyEndpointSettingRequest, PolicyEndpointRequest, RequestType,
};

pub use hcn::HcnStore;
pub use memory::MemoryStore;

/// Policy operations on endpoints, addressed by endpoint ID.
///
/// Calls are not retried. Errors come back as `NotFound` for unknown
/// endpoints and `Store` for everything the store rejects.
pub trait EndpointPolicyStore: Send + Sync {
    /// Fetch an endpoint and its current policies.
    fn get_by_id(&self, endpoint_id: &str) -> Result<EndpointDescriptor>;

    /// Apply a raw modify request to an endpoint.
    fn modify_settings(
        &self,
        endpoint_id: &str,
        request: &ModifyEndpointSettingRequest,
    ) -> Result<()>;

    /// Add or remove a list of policies.
    fn apply_policy(
        &self,
        endpoint_id: &str,
        request_type: RequestType,
        request: &PolicyEndpointRequest,
    ) -> Result<()> {
        let modify = ModifyEndpointSettingRequest::policies(request_type, request)?;
        self.modify_settings(endpoint_id, &modify)
    }
}
