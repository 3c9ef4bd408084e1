//! proxyctl core: policy model, store wire codec, and diagnostic stream parsing.
//!
//! This crate holds everything that can be expressed as a pure transformation:
//! validating a caller's layer-4 proxy policy, mapping it to and from the
//! Host Networking Service (HNS) wire schema, and splitting the concatenated
//! output of the endpoint diagnostic tool into records. It carries no process
//! or OS dependencies so the host crate and tests can share it.
//!
//! # Panic-free
//! `unwrap`, `expect` and `panic!` are compile-denied here. Malformed store
//! payloads and diagnostic records surface as `ProxyCtlError`.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod diag;
pub mod error;
pub mod policy;

/// Shared result type.
pub use error::{ErrorKind, ProxyCtlError, Result};
pub use policy::{Policy, Protocol, LOCAL_SYSTEM_SID};
