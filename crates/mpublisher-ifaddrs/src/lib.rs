// # if-addrs Interface Source
//
// This crate provides the network interface inventory used for A-record
// fan-out, built on the `if-addrs` crate.
//
// `if-addrs` reports one entry per assigned address. Entries are grouped
// back into interfaces, keeping the order in which the OS reported them,
// so the first IPv4 address of each interface stays first.

use mpublisher_core::traits::{InterfaceSource, NetInterface};
use mpublisher_core::{Error, Result};
use std::net::IpAddr;
use tracing::debug;

/// Interface source backed by `if_addrs::get_if_addrs()`
#[derive(Debug, Clone, Copy, Default)]
pub struct IfAddrsSource;

impl IfAddrsSource {
    /// Create a new interface source
    pub fn new() -> Self {
        Self
    }
}

impl InterfaceSource for IfAddrsSource {
    fn interfaces(&self) -> Result<Vec<NetInterface>> {
        let entries = if_addrs::get_if_addrs()
            .map_err(|e| Error::interfaces(format!("failed to list interfaces: {}", e)))?;

        Ok(group_by_interface(
            entries
                .into_iter()
                .map(|iface| {
                    let ip = iface.ip();
                    (iface.name, iface.index, ip)
                }),
        ))
    }
}

/// Group per-address entries into interfaces, preserving report order
///
/// Entries are grouped by interface index; the first name seen for an
/// index is kept.
///
/// Entries without an interface index cannot be scoped and are dropped.
/// Interfaces that only carry IPv6 addresses are kept with an empty IPv4
/// list.
pub fn group_by_interface(
    entries: impl IntoIterator<Item = (String, Option<u32>, IpAddr)>,
) -> Vec<NetInterface> {
    let mut interfaces: Vec<NetInterface> = Vec::new();

    for (name, index, ip) in entries {
        let Some(index) = index else {
            debug!("Interface {} has no index, skipping {}", name, ip);
            continue;
        };

        // Alias labels (eth0:1) share the index of their parent interface
        let pos = match interfaces.iter().position(|i| i.index == index) {
            Some(pos) => pos,
            None => {
                interfaces.push(NetInterface::new(name, index, Vec::new()));
                interfaces.len() - 1
            }
        };

        if let IpAddr::V4(v4) = ip {
            interfaces[pos].ipv4.push(v4);
        }
    }

    interfaces
}
