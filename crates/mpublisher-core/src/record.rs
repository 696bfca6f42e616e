//! DNS record types handed to the name-service daemon

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::rdata;

/// DNS class IN
pub const DNS_CLASS_IN: u16 = 1;

/// Wire-level DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DnsType {
    /// Address record (IPv4)
    A,
    /// Canonical name record
    Cname,
}

impl DnsType {
    /// Numeric type code (RFC 1035)
    pub fn code(self) -> u16 {
        match self {
            DnsType::A => 1,
            DnsType::Cname => 5,
        }
    }
}

/// Where a record is published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    /// Every interface and protocol the daemon serves
    Any,
    /// One interface, IPv4 only
    Interface(u32),
}

/// A DNS resource record ready to be added to a record group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Owner name of the record
    pub name: String,
    /// Record type
    pub dns_type: DnsType,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Wire-format payload
    pub rdata: Vec<u8>,
    /// Interface scope
    pub scope: RecordScope,
    /// Permit several records with the same name in one group
    pub allow_multiple: bool,
}

/// Record type requested by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Alias the name to this host's FQDN
    #[default]
    Cname,
    /// Point the name at this host's IPv4 address on every interface
    A,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Cname => f.write_str("CNAME"),
            RecordType::A => f.write_str("A"),
        }
    }
}

impl FromStr for RecordType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.eq_ignore_ascii_case("cname") {
            Ok(RecordType::Cname)
        } else if s.eq_ignore_ascii_case("a") {
            Ok(RecordType::A)
        } else {
            Err(Error::invalid_argument(format!(
                "unsupported record type '{}' (expected CNAME or A)",
                s
            )))
        }
    }
}

/// An IPv4 address bound to one interface index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopedIpv4 {
    /// Interface index the address was found on
    pub index: u32,
    /// The address
    pub addr: Ipv4Addr,
}

/// Payload of one publish request
///
/// Each variant carries everything needed to build its records, so the
/// publisher expands any payload through [`RecordPayload::into_records`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordPayload {
    /// One CNAME pointing at `target`
    Cname {
        /// Target FQDN (normally the local identity)
        target: String,
    },
    /// One A record per interface-scoped address
    A {
        /// Addresses to publish, one per interface
        addrs: Vec<ScopedIpv4>,
    },
}

impl RecordPayload {
    /// Expand the payload into wire-ready records for `name`
    pub fn into_records(self, name: &str, ttl: u32) -> Result<Vec<Record>> {
        match self {
            RecordPayload::Cname { target } => Ok(vec![Record {
                name: name.to_string(),
                dns_type: DnsType::Cname,
                ttl,
                rdata: rdata::fqdn_to_rdata(&target)?,
                scope: RecordScope::Any,
                allow_multiple: false,
            }]),
            RecordPayload::A { addrs } => Ok(addrs
                .into_iter()
                .map(|scoped| Record {
                    name: name.to_string(),
                    dns_type: DnsType::A,
                    ttl,
                    rdata: rdata::ipv4_to_rdata(scoped.addr).to_vec(),
                    scope: RecordScope::Interface(scoped.index),
                    allow_multiple: true,
                })
                .collect()),
        }
    }
}
