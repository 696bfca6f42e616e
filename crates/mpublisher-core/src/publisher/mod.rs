//! Publisher facade
//!
//! The [`Publisher`] owns the daemon connection, the local identity and the
//! published-name inventory, and exposes the public operations:
//! - `publish`: conflict check → record encoding → group commit → inventory
//! - `unpublish`: group reset → inventory removal
//! - `resolve`, `count`, `available`
//!
//! ## Publish Flow
//!
//! ```text
//!   publish(name, force, type)
//!            │
//!            ▼
//!   ┌────────────────┐  Conflict   ┌──────────────┐
//!   │ ConflictGuard  │────────────▶│ Ok(false)    │
//!   └────────────────┘             └──────────────┘
//!            │ Forced / Clear / SelfOwned
//!            ▼
//!   ┌────────────────┐
//!   │ RecordPayload  │◀── InterfaceSource (A only)
//!   └────────────────┘
//!            │ into_records()
//!            ▼
//!   ┌────────────────────┐
//!   │ RecordGroupManager │── RecordGroup::build → install
//!   └────────────────────┘
//! ```
//!
//! ## Teardown
//!
//! Dropping the publisher withdraws every published name and closes the
//! daemon connection. Errors during teardown are logged and swallowed.

use tracing::{debug, error, info, warn};

use crate::config::PublisherConfig;
use crate::error::{Error, Result};
use crate::groups::{RecordGroup, RecordGroupManager};
use crate::guard::{ConflictGuard, Verdict};
use crate::record::{RecordPayload, RecordType, ScopedIpv4};
use crate::resolver::NameResolver;
use crate::traits::{InterfaceSource, NameDaemon};

/// Publishes and withdraws mDNS names through a name-service daemon
///
/// All operations are blocking round trips to the daemon. Mutating
/// operations take `&mut self`; share a publisher across threads only
/// behind a lock.
pub struct Publisher {
    /// Connection to the name-service daemon
    daemon: Box<dyn NameDaemon>,

    /// Interface inventory for A records
    interfaces: Box<dyn InterfaceSource>,

    /// Local FQDN, fetched once at construction
    identity: String,

    /// Daemon instance the groups were committed to
    instance: Option<String>,

    /// TTL of every record this publisher creates
    ttl: u32,

    /// Published names and their committed groups
    groups: RecordGroupManager,
}

impl Publisher {
    /// Create a publisher on top of an established daemon connection
    ///
    /// # Returns
    ///
    /// - `Ok(Publisher)`: Ready to publish
    /// - `Err(Error::Connect)`: The daemon did not report a host name
    /// - `Err(Error::Config)`: Invalid configuration
    pub fn new(
        daemon: Box<dyn NameDaemon>,
        interfaces: Box<dyn InterfaceSource>,
        config: PublisherConfig,
    ) -> Result<Self> {
        config.validate()?;

        let identity = daemon
            .host_name_fqdn()
            .map_err(|e| Error::connect(format!("failed to fetch local host name: {}", e)))?;

        let instance = daemon.instance_id().unwrap_or_else(|e| {
            debug!("Daemon instance unknown: {}", e);
            None
        });

        debug!("mDNS publisher for: {} (daemon {:?})", identity, instance);

        Ok(Self {
            daemon,
            interfaces,
            identity,
            instance,
            ttl: config.ttl_secs,
            groups: RecordGroupManager::new(),
        })
    }

    /// Local FQDN used as CNAME target and ownership reference
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Daemon instance seen at construction, if the daemon reports one
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// TTL of published records (in seconds)
    pub fn ttl(&self) -> u32 {
        self.ttl
    }

    /// Number of names currently published
    pub fn count(&self) -> usize {
        self.groups.len()
    }

    /// Whether `name` is currently published by this instance
    pub fn is_published(&self, name: &str) -> bool {
        self.groups.contains(name)
    }

    /// Names currently published by this instance, sorted
    pub fn published_names(&self) -> Vec<String> {
        self.groups.names()
    }

    /// The committed group published under `name`
    pub fn group(&self, name: &str) -> Option<&RecordGroup> {
        self.groups.get(name)
    }

    /// Look up the current owner of `name` on the network
    pub fn resolve(&self, name: &str) -> Option<String> {
        NameResolver::new(self.daemon.as_ref()).resolve(name)
    }

    /// Publish `name`
    ///
    /// # Returns
    ///
    /// - `Ok(true)`: The name is published
    /// - `Ok(false)`: Another host owns the name, or the daemon or the
    ///   interface inventory failed; nothing is published
    /// - `Err(Error::Encoding)`: The local identity cannot be encoded
    ///
    /// Publishing a name that is already published replaces its records.
    pub fn publish(&mut self, name: &str, force: bool, record_type: RecordType) -> Result<bool> {
        let resolver = NameResolver::new(self.daemon.as_ref());
        let verdict = ConflictGuard::new(&self.identity).check(&resolver, name, force);
        if let Verdict::Conflict { owner } = verdict {
            debug!("Not publishing: {}", Error::conflict(name, owner));
            return Ok(false);
        }

        let payload = match self.payload(record_type) {
            Ok(payload) => payload,
            Err(e @ Error::Interfaces(_)) => {
                error!("Failed to publish '{}': {}", name, e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };
        let records = payload.into_records(name, self.ttl)?;

        if self.groups.contains(name) {
            info!("Replacing published records for '{}'", name);
            if let Err(e) = self.groups.withdraw(name) {
                warn!("Failed to withdraw previous records for '{}': {}", name, e);
            }
        }

        let group = match RecordGroup::build(self.daemon.as_ref(), records) {
            Ok(group) => group,
            Err(e) => {
                error!("Failed to publish '{}': {}", name, e);
                return Ok(false);
            }
        };

        info!(
            "Published '{}' ({}, {} record(s))",
            name,
            record_type,
            group.records().len()
        );
        self.groups.install(name, group)?;

        Ok(true)
    }

    /// Publish `name` with the record type given as a string ("CNAME" or "A")
    ///
    /// Fails with [`Error::InvalidArgument`] for any other type, before
    /// anything is sent to the daemon.
    pub fn publish_as(&mut self, name: &str, force: bool, dns_type: &str) -> Result<bool> {
        let record_type: RecordType = dns_type.parse()?;
        self.publish(name, force, record_type)
    }

    /// Publish `name` as a CNAME pointing at this host
    pub fn publish_cname(&mut self, name: &str, force: bool) -> Result<bool> {
        self.publish(name, force, RecordType::Cname)
    }

    /// Publish `name` as A records, one per interface with an IPv4 address
    pub fn publish_a(&mut self, name: &str, force: bool) -> Result<bool> {
        self.publish(name, force, RecordType::A)
    }

    /// Withdraw a published name
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The name is no longer tracked (a failed reset is logged)
    /// - `Err(Error::NotFound)`: The name was not published by this instance
    pub fn unpublish(&mut self, name: &str) -> Result<()> {
        match self.groups.withdraw(name) {
            Ok(()) => {
                info!("Unpublished '{}'", name);
                Ok(())
            }
            Err(e @ Error::NotFound(_)) => Err(e),
            Err(e) => {
                warn!("Unpublished '{}', but the daemon failed to withdraw it: {}", name, e);
                Ok(())
            }
        }
    }

    /// Check whether the daemon still answers
    pub fn available(&self) -> bool {
        match self.daemon.version_string() {
            Ok(version) => {
                debug!("Name-service daemon is available: {}", version);
                true
            }
            Err(e) => {
                debug!("Name-service daemon is unavailable: {}", e);
                false
            }
        }
    }

    /// Whether the daemon was replaced by a new instance since construction
    ///
    /// A replaced daemon has dropped every group this publisher committed.
    /// Returns false when either instance is unknown.
    pub fn restarted(&self) -> bool {
        let Some(known) = self.instance.as_deref() else {
            return false;
        };
        match self.daemon.instance_id() {
            Ok(Some(current)) if current != known => {
                debug!("Daemon instance changed: {} -> {}", known, current);
                true
            }
            Ok(_) => false,
            Err(e) => {
                debug!("Daemon instance unknown: {}", e);
                false
            }
        }
    }

    /// Build the payload for a publish request
    fn payload(&self, record_type: RecordType) -> Result<RecordPayload> {
        match record_type {
            RecordType::Cname => Ok(RecordPayload::Cname {
                target: self.identity.clone(),
            }),
            RecordType::A => {
                let mut addrs = Vec::new();
                for iface in self.interfaces.interfaces()? {
                    let Some(addr) = iface.primary_ipv4() else {
                        debug!("Interface {} has no IPv4 address, skipping", iface.name);
                        continue;
                    };
                    debug!("Found interface: {}, IP: {}, index {}", iface.name, addr, iface.index);
                    addrs.push(ScopedIpv4 {
                        index: iface.index,
                        addr,
                    });
                }

                if addrs.is_empty() {
                    return Err(Error::interfaces("no interface has an IPv4 address"));
                }

                Ok(RecordPayload::A { addrs })
            }
        }
    }
}

impl Drop for Publisher {
    fn drop(&mut self) {
        for (name, e) in self.groups.withdraw_all() {
            debug!("Failed to withdraw '{}' during teardown: {}", name, e);
        }

        if let Err(e) = self.daemon.close() {
            debug!("Failed to close daemon connection: {}", e);
        }
    }
}
