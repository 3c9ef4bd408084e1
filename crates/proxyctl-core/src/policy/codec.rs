//! `Policy` <-> HNS wire mapping.
//!
//! Two failure regimes live here and are kept apart on purpose:
//! - numeric strings inside a settings payload (port, protocol) that do not
//!   parse are read as zero; the store is trusted to return what it was given;
//! - a settings payload that is not a proxy policy at all is a `Schema` error.

use std::net::IpAddr;
use std::str::FromStr;

use serde_json::value::RawValue;

use crate::error::{ProxyCtlError, Result};

use super::model::{Policy, Protocol};
use super::wire::{EndpointPolicyRecord, FiveTuple, PolicyKind, ProxyType, WireProxyPolicy};

/// Map a policy to its wire settings. Pure; callers must `validate` first.
pub fn encode(policy: &Policy) -> WireProxyPolicy {
    // Whatever the caller put in `protocol` is overwritten.
    let protocol = Protocol::TCP;

    WireProxyPolicy {
        proxy_type: ProxyType::WFP,
        port: policy.proxy_port.to_string(),
        user_sid: policy.user_sid.clone(),
        compartment_id: policy.compartment_id,
        filter_tuple: FiveTuple {
            local_addresses: format_addr(policy.local_addr),
            remote_addresses: format_addr(policy.remote_addr),
            protocols: protocol.to_string(),
            priority: u16::from(policy.priority),
        },
    }
}

/// Map wire settings back to a policy.
///
/// Port and protocol strings that do not parse read as 0. A wire priority
/// wider than a byte keeps only its low byte.
pub fn decode(wire: &WireProxyPolicy) -> Policy {
    let tuple = &wire.filter_tuple;
    Policy {
        proxy_port: parse_or_zero("Port", &wire.port),
        user_sid: wire.user_sid.clone(),
        compartment_id: wire.compartment_id,
        local_addr: parse_addr("LocalAddresses", &tuple.local_addresses),
        remote_addr: parse_addr("RemoteAddresses", &tuple.remote_addresses),
        priority: truncate_priority(tuple.priority),
        protocol: Protocol(parse_or_zero("Protocols", &tuple.protocols)),
    }
}

/// Wrap wire settings into an `L4Proxy` store record.
pub fn to_envelope(wire: &WireProxyPolicy) -> Result<EndpointPolicyRecord> {
    let settings = serde_json::value::to_raw_value(wire)
        .map_err(|e| ProxyCtlError::Schema(format!("encode proxy settings failed: {e}")))?;
    Ok(EndpointPolicyRecord {
        kind: PolicyKind::L4Proxy,
        settings: Some(settings),
    })
}

/// Unwrap an `L4Proxy` store record into wire settings.
///
/// Records of any other kind must be filtered out by the caller
/// (see `proxy_records`); handing one in is reported, not tolerated.
pub fn from_envelope(record: &EndpointPolicyRecord) -> Result<WireProxyPolicy> {
    if !record.is_proxy() {
        return Err(ProxyCtlError::Schema(format!(
            "not an L4Proxy policy: {}",
            record.kind
        )));
    }
    let raw: &RawValue = record
        .settings
        .as_deref()
        .ok_or_else(|| ProxyCtlError::Schema("L4Proxy policy has no settings".into()))?;
    serde_json::from_str(raw.get())
        .map_err(|e| ProxyCtlError::Schema(format!("invalid L4Proxy settings: {e}")))
}

/// Keep only the proxy-kind records, in store order.
pub fn proxy_records(records: &[EndpointPolicyRecord]) -> Vec<EndpointPolicyRecord> {
    records.iter().filter(|r| r.is_proxy()).cloned().collect()
}

fn format_addr(addr: Option<IpAddr>) -> String {
    addr.map(|a| a.to_string()).unwrap_or_default()
}

fn parse_addr(field: &'static str, s: &str) -> Option<IpAddr> {
    if s.is_empty() {
        return None;
    }
    match s.parse() {
        Ok(addr) => Some(addr),
        Err(_) => {
            tracing::debug!(field, value = s, "unparseable address, reading as unset");
            None
        }
    }
}

fn truncate_priority(wire: u16) -> u8 {
    if wire > u16::from(u8::MAX) {
        tracing::debug!(value = wire, "priority wider than a byte, keeping low byte");
    }
    wire as u8
}

// Soft spot: the store never returns malformed numbers, so this does not
// surface an error. Do not copy this pattern to structural fields.
fn parse_or_zero<T: FromStr + Default>(field: &'static str, s: &str) -> T {
    s.parse().unwrap_or_else(|_| {
        tracing::debug!(field, value = s, "malformed numeric field, reading as 0");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn numeric_strings_tolerate_garbage() {
        assert_eq!(parse_or_zero::<u16>("Port", "8080"), 8080);
        assert_eq!(parse_or_zero::<u16>("Port", ""), 0);
        assert_eq!(parse_or_zero::<u16>("Port", "-1"), 0);
        assert_eq!(parse_or_zero::<u16>("Port", "70000"), 0);
        assert_eq!(parse_or_zero::<u8>("Protocols", "6,17"), 0);
    }

    #[test]
    fn wide_priority_keeps_low_byte() {
        assert_eq!(truncate_priority(9), 9);
        assert_eq!(truncate_priority(255), 255);
        assert_eq!(truncate_priority(256), 0);
        assert_eq!(truncate_priority(300), 44);
    }

    #[test]
    fn addresses_render_canonically() {
        let v6: IpAddr = "fe80:0:0:0:0:0:0:1".parse().unwrap();
        assert_eq!(format_addr(Some(v6)), "fe80::1");
        assert_eq!(format_addr(None), "");
        assert_eq!(parse_addr("LocalAddresses", ""), None);
        assert_eq!(parse_addr("LocalAddresses", "not-an-ip"), None);
    }
}
