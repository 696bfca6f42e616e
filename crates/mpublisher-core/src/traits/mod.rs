//! Collaborator traits for the mDNS publisher
//!
//! This module defines the narrow interfaces the publisher consumes.
//!
//! - [`NameDaemon`]: Request/response surface of the local name-service daemon
//! - [`EntryGroup`]: Commit/reset lifecycle of one daemon-side record group
//! - [`InterfaceSource`]: Network interface inventory for A-record fan-out

pub mod interfaces;
pub mod name_daemon;

pub use interfaces::{InterfaceSource, NetInterface};
pub use name_daemon::{EntryGroup, NameDaemon};
