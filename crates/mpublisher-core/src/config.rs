//! Configuration types for the mDNS publisher
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::record::RecordType;

/// Publisher settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherConfig {
    /// TTL of every published record (in seconds)
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u32,
}

impl PublisherConfig {
    /// Create a configuration with the given record TTL
    pub fn with_ttl(ttl_secs: u32) -> Self {
        Self { ttl_secs }
    }

    /// Validate the publisher configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.ttl_secs == 0 {
            return Err(crate::Error::config("Record TTL must be > 0"));
        }
        Ok(())
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

/// A name to publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordConfig {
    /// Name to publish (e.g., "printer.local")
    pub name: String,

    /// Record type (CNAME to this host, or A records per interface)
    #[serde(default)]
    pub record_type: RecordType,

    /// Publish even if another host already answers for the name
    #[serde(default)]
    pub force: bool,
}

impl RecordConfig {
    /// Create a new record configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            record_type: RecordType::Cname,
            force: false,
        }
    }

    /// Set the record type
    pub fn with_record_type(mut self, record_type: RecordType) -> Self {
        self.record_type = record_type;
        self
    }

    /// Skip the ownership check when publishing
    pub fn with_force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

/// Daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Publisher settings
    #[serde(default)]
    pub publisher: PublisherConfig,

    /// Names to publish
    pub records: Vec<RecordConfig>,

    /// How often to check that the name-service daemon is still there
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,
}

impl DaemonConfig {
    /// Create a configuration publishing `records` with default settings
    pub fn new(records: Vec<RecordConfig>) -> Self {
        Self {
            publisher: PublisherConfig::default(),
            records,
            check_interval_secs: default_check_interval_secs(),
        }
    }

    /// Parse a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, crate::Error> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.records.is_empty() {
            return Err(crate::Error::config("No records configured"));
        }

        for record in &self.records {
            validate_name(&record.name)?;
        }

        if !(1..=3600).contains(&self.check_interval_secs) {
            return Err(crate::Error::config(format!(
                "Check interval must be between 1 and 3600 seconds. Got: {}",
                self.check_interval_secs
            )));
        }

        self.publisher.validate()
    }
}

/// Basic RFC 1035 name checks; a single trailing dot is accepted
fn validate_name(name: &str) -> Result<(), crate::Error> {
    let trimmed = name.strip_suffix('.').unwrap_or(name);

    if trimmed.is_empty() {
        return Err(crate::Error::config("Record name cannot be empty"));
    }

    if trimmed.len() > 253 {
        return Err(crate::Error::config(format!(
            "Record name too long: {} chars (max 253). Got: {}",
            trimmed.len(),
            name
        )));
    }

    for label in trimmed.split('.') {
        if label.is_empty() {
            return Err(crate::Error::config(format!(
                "Record name has empty label: '{}'",
                name
            )));
        }
        if label.len() > 63 {
            return Err(crate::Error::config(format!(
                "Record label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }
        if !label.is_ascii() {
            return Err(crate::Error::config(format!(
                "Record label must be ASCII. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

fn default_ttl_secs() -> u32 {
    60
}

fn default_check_interval_secs() -> u64 {
    5
}
