// # Interface Source Trait
//
// Defines the network interface inventory used for A-record fan-out.
//
// ## Implementations
//
// - `if-addrs` based: `mpublisher-ifaddrs` crate

use std::net::Ipv4Addr;

/// One network interface and the IPv4 addresses assigned to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetInterface {
    /// Interface name (e.g., "eth0")
    pub name: String,
    /// Numeric interface index, as used to scope records
    pub index: u32,
    /// Assigned IPv4 addresses, in the order the OS reports them
    pub ipv4: Vec<Ipv4Addr>,
}

impl NetInterface {
    /// Create a new interface entry
    pub fn new(name: impl Into<String>, index: u32, ipv4: Vec<Ipv4Addr>) -> Self {
        Self {
            name: name.into(),
            index,
            ipv4,
        }
    }

    /// First IPv4 address reported for this interface, if any
    pub fn primary_ipv4(&self) -> Option<Ipv4Addr> {
        self.ipv4.first().copied()
    }
}

/// Trait for network interface inventories
///
/// Implementations list every interface, including those without IPv4
/// addresses. Filtering is the caller's decision.
pub trait InterfaceSource: Send {
    /// Enumerate interfaces in the order the OS reports them
    fn interfaces(&self) -> Result<Vec<NetInterface>, crate::Error>;
}
