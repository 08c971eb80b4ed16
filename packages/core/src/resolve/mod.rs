//! Host name resolution
//!
//! Fast path for IP literals, otherwise the platform resolver. Resolution
//! failures are `Resolver`-kind errors so callers can tell them apart from
//! socket errors raised later in the same operation.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use crate::error::{self, Error, ResolverCode, Result};
use crate::sys::{Backend, Handle, Platform};

/// Resolves `host` to one address, preferring IPv4.
pub fn lookup_address(host: &str) -> Result<IpAddr> {
    if host.is_empty() {
        return Err(error::illegal_argument());
    }

    if let Ok(ip) = IpAddr::from_str(host) {
        return Ok(ip);
    }

    let addrs = lookup_all(host)?;
    let chosen = addrs
        .iter()
        .find(|ip| ip.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| Error::new(ResolverCode::NoData))?;

    tracing::trace!("resolved {} to {}", host, chosen);
    Ok(chosen)
}

/// Resolves `host` to every address the platform resolver returns.
pub fn lookup_all(host: &str) -> Result<Vec<IpAddr>> {
    if let Ok(ip) = IpAddr::from_str(host) {
        return Ok(vec![ip]);
    }

    let addrs = Platform::resolve(host).inspect_err(|e| {
        tracing::debug!("DNS resolution failed for {}: {}", host, e);
    })?;

    if addrs.is_empty() {
        return Err(Error::new(ResolverCode::NoData));
    }
    Ok(addrs)
}

/// The local port a socket is bound to.
pub(crate) fn lookup_port(handle: &Handle) -> Result<u16> {
    let addr = handle.socket()?.local_addr()?;
    addr.as_socket()
        .map(|addr| addr.port())
        .ok_or_else(error::illegal_state)
}

/// The host name of this machine.
pub fn lookup_local_host_name() -> Result<String> {
    let name = hostname::get()?;
    name.into_string().map_err(|_| error::illegal_state())
}

/// The address the local host name resolves to, or loopback when the host
/// name does not resolve.
pub fn lookup_local_host_address() -> Result<IpAddr> {
    let name = lookup_local_host_name()?;
    match lookup_address(&name) {
        Ok(ip) => Ok(ip),
        Err(e) if e.is_resolver() => {
            tracing::debug!("local host name {} does not resolve, using loopback", name);
            Ok(IpAddr::V4(Ipv4Addr::LOCALHOST))
        }
        Err(e) => Err(e),
    }
}
