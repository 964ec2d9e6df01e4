//! Validated public IPv4 address
//!
//! A [`PublicAddress`] can only be built from an address that is safe to
//! publish as a DNS A record: loopback, link-local and RFC 1918 addresses
//! are rejected, because seeing one means the resolver is looking at the
//! inside of a NAT or a misconfigured proxy.

use crate::error::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// A validated, publicly routable IPv4 address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicAddress(Ipv4Addr);

impl PublicAddress {
    /// Validate an already parsed address
    ///
    /// # Returns
    ///
    /// - `Ok(PublicAddress)`: The address is public
    /// - `Err(Error::Resolution)`: The address is loopback, link-local or private
    pub fn new(ip: Ipv4Addr) -> Result<Self> {
        if !is_public_address(ip) {
            return Err(Error::resolution(format!("{} is a private IP", ip)));
        }
        Ok(Self(ip))
    }
}

impl fmt::Display for PublicAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PublicAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let ip = parse_ipv4(s)?;
        Self::new(ip)
    }
}

impl From<PublicAddress> for Ipv4Addr {
    fn from(addr: PublicAddress) -> Self {
        addr.0
    }
}

/// Parse a dotted-quad IPv4 literal
///
/// Accepts exactly four decimal octets in 0-255.
pub fn parse_ipv4(s: &str) -> Result<Ipv4Addr> {
    s.parse::<Ipv4Addr>()
        .map_err(|_| Error::resolution(format!("couldn't parse IP {}", s)))
}

/// Whether an address may be published as a public A record
///
/// Returns `false` for loopback (127.0.0.0/8), link-local unicast
/// (169.254.0.0/16), link-local multicast (224.0.0.0/24) and the private
/// ranges 10.0.0.0/8, 172.16.0.0/12 and 192.168.0.0/16.
pub fn is_public_address(ip: Ipv4Addr) -> bool {
    if ip.is_loopback() || ip.is_link_local() || is_link_local_multicast(ip) {
        return false;
    }
    !ip.is_private()
}

fn is_link_local_multicast(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    a == 224 && b == 0 && c == 0
}
