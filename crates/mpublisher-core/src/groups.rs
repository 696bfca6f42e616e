//! Record groups and the inventory of published names
//!
//! A [`RecordGroup`] moves through `Open → Committed → Withdrawn`. The
//! [`RecordGroupManager`] only ever stores committed groups, one per name,
//! so a name present in the manager is a name this publisher advertises.

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::error::{Error, Result};
use crate::record::Record;
use crate::traits::{EntryGroup, NameDaemon};

/// Lifecycle state of a record group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupState {
    /// Records may be added; nothing is advertised yet
    Open,
    /// Records are active on the network
    Committed,
    /// Records were withdrawn; the group is spent
    Withdrawn,
}

/// A set of records committed atomically under one name
pub struct RecordGroup {
    handle: Box<dyn EntryGroup>,
    state: GroupState,
    records: Vec<Record>,
}

impl fmt::Debug for RecordGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordGroup")
            .field("state", &self.state)
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}

impl RecordGroup {
    /// Wrap a fresh daemon-side group
    pub fn open(handle: Box<dyn EntryGroup>) -> Self {
        Self {
            handle,
            state: GroupState::Open,
            records: Vec::new(),
        }
    }

    /// Create a group on the daemon, add `records` and commit it
    ///
    /// On failure the partially built group is reset before the error is
    /// returned.
    pub fn build(daemon: &dyn NameDaemon, records: Vec<Record>) -> Result<Self> {
        let mut group = Self::open(daemon.entry_group_new()?);

        let filled = records
            .into_iter()
            .try_for_each(|record| group.add(record))
            .and_then(|_| group.commit());

        if let Err(e) = filled {
            if let Err(reset_err) = group.withdraw() {
                debug!("Failed to reset aborted group: {}", reset_err);
            }
            return Err(e);
        }

        Ok(group)
    }

    /// Current lifecycle state
    pub fn state(&self) -> GroupState {
        self.state
    }

    /// Records added to this group
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Add a record; only valid while the group is open
    pub fn add(&mut self, record: Record) -> Result<()> {
        if self.state != GroupState::Open {
            return Err(Error::group(format!(
                "cannot add '{}' to a {:?} group",
                record.name, self.state
            )));
        }
        self.handle.add_record(&record)?;
        self.records.push(record);
        Ok(())
    }

    /// Commit the group; it must be open and hold at least one record
    pub fn commit(&mut self) -> Result<()> {
        if self.state != GroupState::Open {
            return Err(Error::group(format!("cannot commit a {:?} group", self.state)));
        }
        if self.records.is_empty() {
            return Err(Error::group("cannot commit an empty group"));
        }
        self.handle.commit()?;
        self.state = GroupState::Committed;
        Ok(())
    }

    /// Withdraw every record of the group
    ///
    /// The group is considered spent even when the daemon reports an error.
    pub fn withdraw(&mut self) -> Result<()> {
        if self.state == GroupState::Withdrawn {
            return Ok(());
        }
        self.state = GroupState::Withdrawn;
        self.handle.reset()
    }
}

/// Owns the published-name inventory
#[derive(Debug, Default)]
pub struct RecordGroupManager {
    published: HashMap<String, RecordGroup>,
}

impl RecordGroupManager {
    /// Create an empty inventory
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a committed group under `name`
    ///
    /// Fails if the group is not committed or `name` is already tracked;
    /// callers withdraw the old group first.
    pub fn install(&mut self, name: &str, group: RecordGroup) -> Result<()> {
        if group.state() != GroupState::Committed {
            return Err(Error::group(format!(
                "refusing to track a {:?} group for '{}'",
                group.state(),
                name
            )));
        }
        if self.published.contains_key(name) {
            return Err(Error::group(format!("'{}' is already tracked", name)));
        }
        self.published.insert(name.to_string(), group);
        Ok(())
    }

    /// Stop tracking `name` and withdraw its records
    ///
    /// The name is untracked even if the daemon fails to reset the group.
    pub fn withdraw(&mut self, name: &str) -> Result<()> {
        let mut group = self
            .published
            .remove(name)
            .ok_or_else(|| Error::not_found(name))?;
        group.withdraw()
    }

    /// Withdraw every tracked group, returning the failures
    pub fn withdraw_all(&mut self) -> Vec<(String, Error)> {
        self.published
            .drain()
            .filter_map(|(name, mut group)| group.withdraw().err().map(|e| (name, e)))
            .collect()
    }

    /// Number of published names
    pub fn len(&self) -> usize {
        self.published.len()
    }

    /// Whether nothing is published
    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }

    /// Whether `name` is published
    pub fn contains(&self, name: &str) -> bool {
        self.published.contains_key(name)
    }

    /// The group published under `name`
    pub fn get(&self, name: &str) -> Option<&RecordGroup> {
        self.published.get(name)
    }

    /// Published names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.published.keys().cloned().collect();
        names.sort();
        names
    }
}
