//! # Source Address Range
//!
//! A parsed `address/prefix` block (e.g. `10.0.0.0/16` or `1000::/112`) used to
//! pick random source addresses for outgoing probes.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use pnet::ipnetwork::IpNetwork;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Address width in bytes.
    pub fn width(self) -> usize {
        match self {
            Family::V4 => 4,
            Family::V6 => 16,
        }
    }
}

/// An immutable network prefix.
///
/// The stored address is always the canonical network address, so
/// `10.0.0.10/24` is kept as `10.0.0.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddressRange {
    network: IpNetwork,
}

impl AddressRange {
    pub fn new(addr: IpAddr, prefix: u8) -> Result<Self, ConfigError> {
        let network = IpNetwork::new(addr, prefix)
            .and_then(|net| IpNetwork::new(net.network(), prefix))
            .map_err(|_| ConfigError::InvalidPrefix(format!("{addr}/{prefix}")))?;
        Ok(Self { network })
    }

    pub fn network(&self) -> IpAddr {
        self.network.network()
    }

    pub fn mask(&self) -> IpAddr {
        self.network.mask()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    pub fn family(&self) -> Family {
        match self.network {
            IpNetwork::V4(_) => Family::V4,
            IpNetwork::V6(_) => Family::V6,
        }
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.network.contains(addr)
    }
}

impl FromStr for AddressRange {
    type Err = ConfigError;

    /// Parses CIDR notation. A bare address without `/prefix` is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some((addr_str, prefix_str)) = s.split_once('/') else {
            return Err(ConfigError::MissingPrefix(s.to_string()));
        };

        let addr = addr_str
            .parse::<IpAddr>()
            .map_err(|source| ConfigError::InvalidAddress {
                cidr: s.to_string(),
                source,
            })?;

        let prefix = prefix_str
            .parse::<u8>()
            .map_err(|_| ConfigError::InvalidPrefix(s.to_string()))?;

        Self::new(addr, prefix).map_err(|_| ConfigError::InvalidPrefix(s.to_string()))
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network(), self.prefix())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
