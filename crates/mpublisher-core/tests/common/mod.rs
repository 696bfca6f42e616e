//! Test doubles and common utilities for publisher contract tests
//!
//! The doubles record every round trip in shared state so tests can keep a
//! handle after boxing them into a `Publisher`.

#![allow(dead_code)]

use mpublisher_core::error::{Error, Result};
use mpublisher_core::traits::{EntryGroup, InterfaceSource, NameDaemon, NetInterface};
use mpublisher_core::{DnsType, Publisher, PublisherConfig, Record};
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Everything one daemon-side group saw
#[derive(Default)]
pub struct GroupLog {
    records: Mutex<Vec<Record>>,
    commit_count: AtomicUsize,
    reset_count: AtomicUsize,
}

impl GroupLog {
    /// Records added to the group
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }

    /// Records of the given type
    pub fn records_of(&self, dns_type: DnsType) -> Vec<Record> {
        self.records()
            .into_iter()
            .filter(|r| r.dns_type == dns_type)
            .collect()
    }

    /// Number of times commit() was called
    pub fn commit_count(&self) -> usize {
        self.commit_count.load(Ordering::SeqCst)
    }

    /// Number of times reset() was called
    pub fn reset_count(&self) -> usize {
        self.reset_count.load(Ordering::SeqCst)
    }

    /// Committed and not reset since
    pub fn is_live(&self) -> bool {
        self.commit_count() > 0 && self.reset_count() == 0
    }
}

/// Shared state of a [`MockDaemon`]
pub struct DaemonState {
    identity: String,
    owner: Mutex<Option<String>>,
    instance: Mutex<Option<String>>,
    reachable: AtomicBool,
    fail_commit: AtomicBool,
    fail_reset: AtomicBool,
    resolve_call_count: AtomicUsize,
    version_call_count: AtomicUsize,
    close_call_count: AtomicUsize,
    groups: Mutex<Vec<Arc<GroupLog>>>,
}

impl DaemonState {
    /// Make every lookup answer with `owner` (`None` = no answer)
    pub fn set_owner(&self, owner: Option<&str>) {
        *self.owner.lock().unwrap() = owner.map(str::to_string);
    }

    /// Report `instance` as the running daemon process (`None` = unknown)
    pub fn set_instance(&self, instance: Option<&str>) {
        *self.instance.lock().unwrap() = instance.map(str::to_string);
    }

    /// Simulate the daemon going away or coming back
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Make group commits fail
    pub fn set_fail_commit(&self, fail: bool) {
        self.fail_commit.store(fail, Ordering::SeqCst);
    }

    /// Make group resets fail
    pub fn set_fail_reset(&self, fail: bool) {
        self.fail_reset.store(fail, Ordering::SeqCst);
    }

    /// Number of times resolve_host_name() was called
    pub fn resolve_call_count(&self) -> usize {
        self.resolve_call_count.load(Ordering::SeqCst)
    }

    /// Number of times version_string() was called
    pub fn version_call_count(&self) -> usize {
        self.version_call_count.load(Ordering::SeqCst)
    }

    /// Number of times close() was called
    pub fn close_call_count(&self) -> usize {
        self.close_call_count.load(Ordering::SeqCst)
    }

    /// Every group created so far, in creation order
    pub fn groups(&self) -> Vec<Arc<GroupLog>> {
        self.groups.lock().unwrap().clone()
    }

    /// Groups that are currently advertised
    pub fn live_groups(&self) -> Vec<Arc<GroupLog>> {
        self.groups().into_iter().filter(|g| g.is_live()).collect()
    }

    fn check_reachable(&self) -> Result<()> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::transport("org.freedesktop.DBus.Error.ServiceUnknown"))
        }
    }
}

/// A mock NameDaemon that records every call
pub struct MockDaemon {
    state: Arc<DaemonState>,
}

impl MockDaemon {
    /// Create a reachable daemon whose host name is `identity`
    pub fn new(identity: &str) -> Self {
        Self {
            state: Arc::new(DaemonState {
                identity: identity.to_string(),
                owner: Mutex::new(None),
                instance: Mutex::new(None),
                reachable: AtomicBool::new(true),
                fail_commit: AtomicBool::new(false),
                fail_reset: AtomicBool::new(false),
                resolve_call_count: AtomicUsize::new(0),
                version_call_count: AtomicUsize::new(0),
                close_call_count: AtomicUsize::new(0),
                groups: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Handle on the shared state, valid after the daemon is boxed
    pub fn state(&self) -> Arc<DaemonState> {
        Arc::clone(&self.state)
    }
}

impl NameDaemon for MockDaemon {
    fn host_name_fqdn(&self) -> Result<String> {
        self.state.check_reachable()?;
        Ok(self.state.identity.clone())
    }

    fn resolve_host_name(&self, name: &str) -> Result<String> {
        self.state.resolve_call_count.fetch_add(1, Ordering::SeqCst);
        self.state.check_reachable()?;
        self.state
            .owner
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::transport(format!("Timeout reached resolving {}", name)))
    }

    fn entry_group_new(&self) -> Result<Box<dyn EntryGroup>> {
        self.state.check_reachable()?;
        let log = Arc::new(GroupLog::default());
        self.state.groups.lock().unwrap().push(Arc::clone(&log));
        Ok(Box::new(MockGroup {
            log,
            daemon: Arc::clone(&self.state),
        }))
    }

    fn version_string(&self) -> Result<String> {
        self.state.version_call_count.fetch_add(1, Ordering::SeqCst);
        self.state.check_reachable()?;
        Ok("avahi 0.8".to_string())
    }

    fn instance_id(&self) -> Result<Option<String>> {
        self.state.check_reachable()?;
        Ok(self.state.instance.lock().unwrap().clone())
    }

    fn close(&self) -> Result<()> {
        self.state.close_call_count.fetch_add(1, Ordering::SeqCst);
        self.state.check_reachable()
    }
}

/// A mock EntryGroup writing into a [`GroupLog`]
pub struct MockGroup {
    log: Arc<GroupLog>,
    daemon: Arc<DaemonState>,
}

impl EntryGroup for MockGroup {
    fn add_record(&self, record: &Record) -> Result<()> {
        self.daemon.check_reachable()?;
        self.log.records.lock().unwrap().push(record.clone());
        Ok(())
    }

    fn commit(&self) -> Result<()> {
        self.daemon.check_reachable()?;
        if self.daemon.fail_commit.load(Ordering::SeqCst) {
            return Err(Error::transport("org.freedesktop.Avahi.InvalidRecordError"));
        }
        self.log.commit_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn reset(&self) -> Result<()> {
        self.daemon.check_reachable()?;
        if self.daemon.fail_reset.load(Ordering::SeqCst) {
            return Err(Error::transport("org.freedesktop.DBus.Error.NoReply"));
        }
        self.log.reset_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An InterfaceSource returning a fixed inventory
pub struct StaticInterfaces {
    interfaces: Vec<NetInterface>,
    call_count: Arc<AtomicUsize>,
}

impl StaticInterfaces {
    pub fn new(interfaces: Vec<NetInterface>) -> Self {
        Self {
            interfaces,
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Inventory with no interfaces at all
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Shared counter of interfaces() calls
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.call_count)
    }
}

impl InterfaceSource for StaticInterfaces {
    fn interfaces(&self) -> Result<Vec<NetInterface>> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(self.interfaces.clone())
    }
}

/// An InterfaceSource that always fails
pub struct FailingInterfaces;

impl InterfaceSource for FailingInterfaces {
    fn interfaces(&self) -> Result<Vec<NetInterface>> {
        Err(Error::interfaces("getifaddrs failed: permission denied"))
    }
}

/// Two interfaces with one IPv4 address each
pub fn two_ipv4_interfaces() -> Vec<NetInterface> {
    vec![
        NetInterface::new("eth0", 2, vec![Ipv4Addr::new(192, 168, 1, 20)]),
        NetInterface::new("wlan0", 3, vec![Ipv4Addr::new(10, 0, 0, 7)]),
    ]
}

/// Local identity used by all tests
pub const IDENTITY: &str = "myhost.local";

/// Build a publisher over a fresh mock daemon with the given interfaces
pub fn publisher_with(interfaces: Vec<NetInterface>) -> (Publisher, Arc<DaemonState>) {
    let daemon = MockDaemon::new(IDENTITY);
    let state = daemon.state();
    let publisher = Publisher::new(
        Box::new(daemon),
        Box::new(StaticInterfaces::new(interfaces)),
        PublisherConfig::default(),
    )
    .expect("publisher construction succeeds");
    (publisher, state)
}

/// Build a publisher with no interfaces
pub fn publisher() -> (Publisher, Arc<DaemonState>) {
    publisher_with(Vec::new())
}
