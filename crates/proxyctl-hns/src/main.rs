//! proxyctl: program layer-4 proxy policies on HNS endpoints.
//!
//! - add / list / clear proxy policies on an endpoint
//! - lookup the endpoint a container is attached to (via `hnsdiag`)
//!
//! Results go to stdout, logs (`RUST_LOG`) and errors to stderr.

use tracing_subscriber::{fmt, EnvFilter};

use proxyctl_core::error::Result;
use proxyctl_hns::{cli, config, hnsdiag::HnsDiag, store::HcnStore};

fn main() {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(out) => println!("{out}"),
        Err(e) => {
            tracing::debug!(kind = e.kind().as_str(), "command failed");
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

fn run() -> Result<String> {
    let inv = cli::Invocation::parse(std::env::args().skip(1))?;

    let cfg = match &inv.config_path {
        Some(path) => config::load_from_file(path)?,
        None => config::ProxyCtlConfig::default(),
    };

    let store = HcnStore::new();
    let diag = HnsDiag::from_config(&cfg.diagnostic);

    cli::execute(&inv.command, &store, &diag)
}
