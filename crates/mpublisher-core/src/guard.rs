//! Conflict checks performed before publishing a name
//!
//! The guard never lets this host silently take over a name another host
//! is advertising, but tolerates stale claims made by this host itself
//! (e.g. left behind by an unclean shutdown).

use tracing::{error, info, warn};

use crate::resolver::NameResolver;

/// Outcome of a conflict check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Caller forced the publish; no lookup was made
    Forced,
    /// Nobody answered for the name
    Clear,
    /// The name is already advertised by this host
    SelfOwned,
    /// Another host owns the name
    Conflict {
        /// FQDN of the current owner
        owner: String,
    },
}

impl Verdict {
    /// Whether the publish may proceed
    pub fn allows(&self) -> bool {
        !matches!(self, Verdict::Conflict { .. })
    }
}

/// Decides whether a publish may proceed
pub struct ConflictGuard<'a> {
    identity: &'a str,
}

impl<'a> ConflictGuard<'a> {
    /// Create a guard for the given local identity
    pub fn new(identity: &'a str) -> Self {
        Self { identity }
    }

    /// Check whether `name` may be published
    ///
    /// With `force` set the resolver is not consulted at all.
    pub fn check(&self, resolver: &NameResolver<'_>, name: &str, force: bool) -> Verdict {
        if force {
            return Verdict::Forced;
        }

        info!("Checking for '{}' availability...", name);
        match resolver.resolve(name) {
            None => Verdict::Clear,
            Some(owner) if same_host(&owner, self.identity) => {
                warn!("DNS entry '{}' is already being published by this machine", name);
                Verdict::SelfOwned
            }
            Some(owner) => {
                error!("DNS entry '{}' is already owned by '{}'", name, owner);
                Verdict::Conflict { owner }
            }
        }
    }
}

/// Compare two host names, ignoring case and a trailing dot
fn same_host(a: &str, b: &str) -> bool {
    a.trim_end_matches('.').eq_ignore_ascii_case(b.trim_end_matches('.'))
}
