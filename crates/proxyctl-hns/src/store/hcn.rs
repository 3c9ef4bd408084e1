//! Host Networking Service backend (`computenetwork.dll`).
//!
//! Endpoints are opened by GUID and queried with a schema v2 query. Modify
//! requests are passed through as JSON. On other platforms every call fails
//! with a `Store` error.
//!
//! These calls wrap the HCN API from windows-rs.
//!
//! ## References
//!
//! - https://learn.microsoft.com/en-us/virtualization/api/hcn/reference/hcnopenendpoint
//! - https://learn.microsoft.com/en-us/virtualization/api/hcn/reference/hcnmodifyendpoint

use proxyctl_core::error::{ProxyCtlError, Result};
use proxyctl_core::policy::{EndpointDescriptor, ModifyEndpointSettingRequest};

use super::EndpointPolicyStore;

/// Property query used for endpoint lookups.
const ENDPOINT_QUERY: &str = r#"{"SchemaVersion":{"Major":2,"Minor":0},"Flags":0}"#;

/// Endpoint store backed by HNS.
#[derive(Debug, Default, Clone, Copy)]
pub struct HcnStore;

impl HcnStore {
    pub fn new() -> Self {
        Self
    }
}

impl EndpointPolicyStore for HcnStore {
    fn get_by_id(&self, endpoint_id: &str) -> Result<EndpointDescriptor> {
        let props = sys::query_endpoint(endpoint_id, ENDPOINT_QUERY)?;
        tracing::trace!(endpoint_id, %props, "endpoint properties");
        serde_json::from_str(&props)
            .map_err(|e| ProxyCtlError::Schema(format!("invalid endpoint properties: {e}")))
    }

    fn modify_settings(
        &self,
        endpoint_id: &str,
        request: &ModifyEndpointSettingRequest,
    ) -> Result<()> {
        let settings = serde_json::to_string(request)
            .map_err(|e| ProxyCtlError::Schema(format!("encode modify request failed: {e}")))?;
        tracing::debug!(endpoint_id, request_type = ?request.request_type, "modifying endpoint");
        sys::modify_endpoint(endpoint_id, &settings)
    }
}

#[cfg(any(target_os = "windows", test))]
fn invalid_endpoint_id(endpoint_id: &str) -> ProxyCtlError {
    ProxyCtlError::NotFound(format!("endpoint {endpoint_id}: not a valid endpoint ID"))
}

/// Failed HCN call: HRESULT code plus the error record HNS attached, if any.
#[derive(Debug)]
struct HcnError {
    hresult: i32,
    record: Option<String>,
}

impl HcnError {
    // HRESULT_FROM_WIN32(ERROR_NOT_FOUND)
    const NOT_FOUND: i32 = 0x8007_0490_u32 as i32;

    fn into_error(self, op: &str, endpoint_id: &str) -> ProxyCtlError {
        if self.hresult == Self::NOT_FOUND {
            return ProxyCtlError::NotFound(format!("endpoint {endpoint_id}"));
        }
        let detail = self.record.as_deref().unwrap_or("");
        ProxyCtlError::Store(format!(
            "{op} {endpoint_id} failed: HRESULT 0x{:08X} {detail}",
            self.hresult as u32
        ))
    }
}

#[cfg(target_os = "windows")]
mod sys {
    use std::ffi::c_void;

    use proxyctl_core::error::Result;
    use windows::core::{GUID, HRESULT, HSTRING, PCWSTR, PWSTR};
    use windows::Win32::System::Com::CoTaskMemFree;
    use windows::Win32::System::HostComputeNetwork::{
        HcnCloseEndpoint, HcnModifyEndpoint, HcnOpenEndpoint, HcnQueryEndpointProperties,
    };

    use super::{invalid_endpoint_id, HcnError};

    /// Accepts `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, optionally in braces.
    pub(super) fn endpoint_guid(endpoint_id: &str) -> Result<GUID> {
        let inner = endpoint_id
            .strip_prefix('{')
            .and_then(|r| r.strip_suffix('}'))
            .unwrap_or(endpoint_id);
        GUID::try_from(inner).map_err(|_| invalid_endpoint_id(endpoint_id))
    }

    /// Open endpoint handle, closed on drop.
    struct Endpoint(*mut c_void);

    impl Endpoint {
        fn open(endpoint_id: &str) -> Result<Self> {
            let guid = endpoint_guid(endpoint_id)?;
            let mut handle = std::ptr::null_mut();
            let mut record = PWSTR::null();
            let result =
                unsafe { HcnOpenEndpoint(&guid, &mut handle, Some(&mut record as *mut PWSTR)) };
            check(result, record).map_err(|e| e.into_error("open endpoint", endpoint_id))?;
            Ok(Self(handle))
        }
    }

    impl Drop for Endpoint {
        fn drop(&mut self) {
            unsafe {
                let _ = HcnCloseEndpoint(self.0);
            }
        }
    }

    pub(super) fn query_endpoint(endpoint_id: &str, query: &str) -> Result<String> {
        let ep = Endpoint::open(endpoint_id)?;
        let query = HSTRING::from(query);
        let mut props = PWSTR::null();
        let mut record = PWSTR::null();
        let result = unsafe {
            HcnQueryEndpointProperties(
                ep.0,
                PCWSTR(query.as_ptr()),
                &mut props,
                Some(&mut record as *mut PWSTR),
            )
        };
        let props = unsafe { take_string(props) };
        check(result, record).map_err(|e| e.into_error("query endpoint", endpoint_id))?;
        Ok(props.unwrap_or_default())
    }

    pub(super) fn modify_endpoint(endpoint_id: &str, settings: &str) -> Result<()> {
        let ep = Endpoint::open(endpoint_id)?;
        let settings = HSTRING::from(settings);
        let mut record = PWSTR::null();
        let result = unsafe {
            HcnModifyEndpoint(
                ep.0,
                PCWSTR(settings.as_ptr()),
                Some(&mut record as *mut PWSTR),
            )
        };
        check(result, record).map_err(|e| e.into_error("modify endpoint", endpoint_id))
    }

    fn check(
        result: windows::core::Result<()>,
        record: PWSTR,
    ) -> std::result::Result<(), HcnError> {
        let record = unsafe { take_string(record) };
        result.map_err(|e| {
            let hresult: HRESULT = e.code();
            HcnError {
                hresult: hresult.0,
                record,
            }
        })
    }

    /// Copy out and free a string allocated by HCN.
    unsafe fn take_string(p: PWSTR) -> Option<String> {
        if p.is_null() {
            return None;
        }
        let s = p.to_string().ok();
        CoTaskMemFree(Some(p.0 as *const c_void));
        s
    }
}

#[cfg(not(target_os = "windows"))]
mod sys {
    use proxyctl_core::error::Result;

    use super::HcnError;

    // E_NOTIMPL
    const UNSUPPORTED: i32 = 0x8000_4001_u32 as i32;

    fn unsupported() -> HcnError {
        HcnError {
            hresult: UNSUPPORTED,
            record: Some("HNS is only available on Windows".into()),
        }
    }

    pub(super) fn query_endpoint(endpoint_id: &str, _query: &str) -> Result<String> {
        Err(unsupported().into_error("query endpoint", endpoint_id))
    }

    pub(super) fn modify_endpoint(endpoint_id: &str, _settings: &str) -> Result<()> {
        Err(unsupported().into_error("modify endpoint", endpoint_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hresult_mapping() {
        let nf = HcnError {
            hresult: HcnError::NOT_FOUND,
            record: None,
        };
        assert_eq!(nf.into_error("open", "x").kind().as_str(), "NOT_FOUND");

        let other = HcnError {
            hresult: 0x803B_0013_u32 as i32,
            record: Some("port exists".into()),
        };
        let msg = other.into_error("modify endpoint", "x").to_string();
        assert!(msg.contains("0x803B0013"), "{msg}");
        assert!(msg.contains("port exists"), "{msg}");
    }

    #[test]
    fn invalid_id_reads_as_not_found() {
        let err = invalid_endpoint_id("ep1");
        assert_eq!(err.kind().as_str(), "NOT_FOUND");
        assert!(err.to_string().contains("ep1"));
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn endpoint_ids_parse_plain_and_braced() {
        let plain = sys::endpoint_guid("9d1a5b0e-4b8e-4a56-a3c9-0b6c6f7e2a11").unwrap();
        let braced = sys::endpoint_guid("{9D1A5B0E-4B8E-4A56-A3C9-0B6C6F7E2A11}").unwrap();
        assert_eq!(plain, braced);
        assert_eq!(plain.data1, 0x9d1a5b0e);
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn malformed_endpoint_id_is_not_found() {
        for s in [
            "",
            "ep1",
            "9d1a5b0e4b8e4a56a3c90b6c6f7e2a11",
            "9d1a5b0e-4b8e-4a56-a3c9-0b6c6f7e2a1g",
        ] {
            let err = sys::endpoint_guid(s).unwrap_err();
            assert_eq!(err.kind().as_str(), "NOT_FOUND", "{s}");
            let err = HcnStore::new().get_by_id(s).unwrap_err();
            assert_eq!(err.kind().as_str(), "NOT_FOUND", "{s}");
        }
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn non_windows_reports_store_error() {
        let err = HcnStore::new()
            .get_by_id("9d1a5b0e-4b8e-4a56-a3c9-0b6c6f7e2a11")
            .unwrap_err();
        assert_eq!(err.kind().as_str(), "STORE");
        assert!(err.to_string().contains("only available on Windows"));
    }
}
