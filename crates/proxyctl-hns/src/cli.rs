//! Command surface of the `proxyctl` binary.
//!
//! Arguments are parsed once into an `Invocation` and handed to `execute`;
//! nothing is kept in statics.

use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use proxyctl_core::error::{ProxyCtlError, Result};
use proxyctl_core::policy::Policy;

use crate::hnsdiag::DiagnosticSource;
use crate::ops;
use crate::store::EndpointPolicyStore;

pub const USAGE: &str = "\
Usage: proxyctl [--config <path>] <command>

Commands:
  add <HNS endpoint ID>        Add a proxy policy to an endpoint.
      -p, --port <port>          port the proxy is listening on (required)
      --usersid <sid>            ignore traffic originating from the specified user SID
      --compartment <id>         only proxy traffic originating from the specified
                                 network compartment
      --localaddr <ip>           only proxy traffic originating from the specified address
      --remoteaddr <ip>          only proxy traffic destined to the specified address
      --priority <n>             the priority of this policy
  list <HNS endpoint ID>       List the active proxy policies on an endpoint.
  clear <HNS endpoint ID>      Remove all proxy policies from an endpoint.
  lookup <container ID>        Report the ID of the HNS endpoint the container is attached to.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Add { endpoint_id: String, policy: Policy },
    List { endpoint_id: String },
    Clear { endpoint_id: String },
    Lookup { container_id: String },
    Help,
}

/// One parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub command: Command,
}

impl Invocation {
    /// Parse arguments, excluding the program name.
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::<String>::into);
        let mut config_path = None;

        let name = loop {
            match args.next() {
                None => return Err(usage("missing command")),
                Some(a) if a == "-h" || a == "--help" => {
                    return Ok(Self { config_path, command: Command::Help })
                }
                Some(a) => match split_flag(&a) {
                    ("--config", inline) => {
                        let path = flag_value("--config", inline, &mut args)?;
                        config_path = Some(PathBuf::from(path));
                    }
                    _ => break a,
                },
            }
        };

        let rest: Vec<String> = args.collect();
        let command = match name.as_str() {
            "add" => parse_add(rest)?,
            "list" => Command::List { endpoint_id: single_arg("list", rest)? },
            "clear" => Command::Clear { endpoint_id: single_arg("clear", rest)? },
            "lookup" => Command::Lookup { container_id: single_arg("lookup", rest)? },
            other => return Err(usage(&format!("unknown command {other:?}"))),
        };

        Ok(Self { config_path, command })
    }
}

/// Run a command and return what should be printed on success.
pub fn execute(
    command: &Command,
    store: &dyn EndpointPolicyStore,
    diag: &dyn DiagnosticSource,
) -> Result<String> {
    match command {
        Command::Add { endpoint_id, policy } => {
            ops::add_policy(store, endpoint_id, policy)?;
            Ok("Successfully added the policy".into())
        }
        Command::List { endpoint_id } => {
            let policies = ops::list_policies(store, endpoint_id)?;
            Ok(format!("{policies:#?}"))
        }
        Command::Clear { endpoint_id } => {
            let removed = ops::clear_policies(store, endpoint_id)?;
            Ok(format!("Removed {removed} policies"))
        }
        Command::Lookup { container_id } => ops::lookup_endpoint(diag, container_id),
        Command::Help => Ok(USAGE.into()),
    }
}

fn parse_add(rest: Vec<String>) -> Result<Command> {
    let mut args = rest.into_iter();
    let mut endpoint_id = None;
    let mut port = None;
    let mut policy = Policy::default();

    while let Some(a) = args.next() {
        if !a.starts_with('-') {
            if endpoint_id.replace(a).is_some() {
                return Err(usage("add takes exactly one endpoint ID"));
            }
            continue;
        }
        let (flag, inline) = split_flag(&a);
        let known = [
            "-p",
            "--port",
            "--usersid",
            "--compartment",
            "--localaddr",
            "--remoteaddr",
            "--priority",
        ];
        if !known.contains(&flag) {
            return Err(usage(&format!("unknown flag {flag} for add")));
        }
        let value = flag_value(flag, inline, &mut args)?;
        match flag {
            "-p" | "--port" => port = Some(parse_value(flag, value)?),
            "--usersid" => policy.user_sid = value,
            "--compartment" => policy.compartment_id = parse_value(flag, value)?,
            "--localaddr" => policy.local_addr = Some(parse_value::<IpAddr>(flag, value)?),
            "--remoteaddr" => policy.remote_addr = Some(parse_value::<IpAddr>(flag, value)?),
            _ => policy.priority = parse_value(flag, value)?,
        }
    }

    let endpoint_id = endpoint_id.ok_or_else(|| usage("add takes exactly one endpoint ID"))?;
    policy.proxy_port = port.ok_or_else(|| usage("required flag --port not set"))?;
    Ok(Command::Add { endpoint_id, policy })
}

fn single_arg(cmd: &str, rest: Vec<String>) -> Result<String> {
    match <[String; 1]>::try_from(rest) {
        Ok([arg]) if !arg.starts_with('-') => Ok(arg),
        _ => Err(usage(&format!("{cmd} takes exactly one argument"))),
    }
}

/// `--flag=value` -> (`--flag`, Some(`value`)).
fn split_flag(a: &str) -> (&str, Option<&str>) {
    match a.split_once('=') {
        Some((flag, value)) if a.starts_with("--") => (flag, Some(value)),
        _ => (a, None),
    }
}

fn flag_value(
    flag: &str,
    inline: Option<&str>,
    args: &mut impl Iterator<Item = String>,
) -> Result<String> {
    match inline {
        Some(v) => Ok(v.to_string()),
        None => args.next().ok_or_else(|| usage(&format!("flag {flag} needs a value"))),
    }
}

fn parse_value<T: FromStr>(flag: &str, raw: String) -> Result<T> {
    raw.parse()
        .map_err(|_| usage(&format!("invalid value {raw:?} for {flag}")))
}

fn usage(msg: &str) -> ProxyCtlError {
    ProxyCtlError::Validation(format!("{msg} (see proxyctl --help)"))
}
