//! proxyctl host integration.
//!
//! Wires the pure codec and scanner from `proxyctl-core` to the systems they
//! serve: the HNS endpoint store (behind `store::EndpointPolicyStore`) and the
//! `hnsdiag` diagnostic tool. `ops` holds the four caller-facing operations;
//! `cli` and the `proxyctl` binary are a thin command surface over them.

pub mod cli;
pub mod config;
pub mod hnsdiag;
pub mod ops;
pub mod store;
