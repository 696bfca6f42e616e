//! Ownership lookups against the name-service daemon

use tracing::debug;

use crate::traits::NameDaemon;

/// Asks the daemon who currently owns a name
///
/// Every failure (not found, timeout, transport error) collapses to `None`:
/// callers only need to know whether somebody answered.
pub struct NameResolver<'a> {
    daemon: &'a dyn NameDaemon,
}

impl<'a> NameResolver<'a> {
    /// Create a resolver borrowing the daemon connection
    pub fn new(daemon: &'a dyn NameDaemon) -> Self {
        Self { daemon }
    }

    /// Look up the current owner of `name`
    ///
    /// Issues exactly one request; no retries.
    pub fn resolve(&self, name: &str) -> Option<String> {
        match self.daemon.resolve_host_name(name) {
            Ok(owner) => {
                debug!("'{}' resolved to '{}'", name, owner);
                Some(owner)
            }
            Err(e) => {
                debug!("'{}' did not resolve: {}", name, e);
                None
            }
        }
    }
}
