// # Name Daemon Trait
//
// Defines the request/response surface of the local name-service daemon.
//
// ## Implementations
//
// - Avahi over D-Bus: `mpublisher-avahi` crate
// - Test doubles: `tests/common/mod.rs`
//
// ## Usage
//
// ```rust,ignore
// use mpublisher_core::NameDaemon;
//
// fn main() -> mpublisher_core::Result<()> {
//     let daemon = /* NameDaemon implementation */;
//
//     let me = daemon.host_name_fqdn()?;
//     let group = daemon.entry_group_new()?;
//     group.add_record(&record)?;
//     group.commit()?;
//
//     Ok(())
// }
// ```

use crate::record::Record;

/// Trait for name-service daemon connections
///
/// Every method is one blocking round trip. Implementations must not retry,
/// cache, or apply their own timeouts: the daemon's defaults apply uniformly
/// and the publisher decides how each failure is surfaced.
pub trait NameDaemon: Send {
    /// Fully-qualified host name the daemon publishes for this machine
    fn host_name_fqdn(&self) -> Result<String, crate::Error>;

    /// Resolve `name` on the network and return the FQDN of its owner
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: The owner's FQDN
    /// - `Err(Error)`: Not found, timed out, or the request failed
    fn resolve_host_name(&self, name: &str) -> Result<String, crate::Error>;

    /// Create a new, empty record group on the daemon
    fn entry_group_new(&self) -> Result<Box<dyn EntryGroup>, crate::Error>;

    /// Version string of the daemon (used as a liveness probe)
    fn version_string(&self) -> Result<String, crate::Error>;

    /// Identifier of the running daemon process, if the transport has one
    ///
    /// A daemon that restarts comes back with a different identifier and
    /// without any of the groups committed to the old one. `Ok(None)` means
    /// restarts cannot be told apart.
    fn instance_id(&self) -> Result<Option<String>, crate::Error> {
        Ok(None)
    }

    /// Close the underlying connection
    ///
    /// Called once during publisher teardown, after every group was reset.
    fn close(&self) -> Result<(), crate::Error> {
        Ok(())
    }
}

/// Daemon-side handle of one record group
///
/// Records added to a group become visible on the network only after
/// [`EntryGroup::commit`], and all of them are withdrawn together by
/// [`EntryGroup::reset`].
pub trait EntryGroup: Send {
    /// Add one record to the (uncommitted) group
    fn add_record(&self, record: &Record) -> Result<(), crate::Error>;

    /// Publish every record added so far
    fn commit(&self) -> Result<(), crate::Error>;

    /// Withdraw every record of the group from the network
    fn reset(&self) -> Result<(), crate::Error>;
}
