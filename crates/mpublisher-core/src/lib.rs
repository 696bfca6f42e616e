// # mpublisher-core
//
// Core library for publishing mDNS names through a local name-service
// daemon (Avahi).
//
// ## Architecture Overview
//
// - **NameDaemon / EntryGroup**: Traits for the daemon's request/response surface
// - **InterfaceSource**: Trait for the network interface inventory
// - **rdata**: Wire-format encoding of record payloads
// - **NameResolver**: Ownership lookups, all failures collapsed to "no answer"
// - **ConflictGuard**: Decides whether a name may be published
// - **RecordGroupManager**: Inventory of published names and their groups
// - **Publisher**: Facade orchestrating the publish/unpublish flow
//
// ## Design Principles
//
// 1. **Never steal a name**: A name answered by another host is not published unless forced
// 2. **Synchronous**: Every operation is a blocking round trip; no background tasks
// 3. **Library-First**: The daemon binary is a thin wrapper around `Publisher`
// 4. **Clean teardown**: Dropping a publisher withdraws everything it published

pub mod config;
pub mod error;
pub mod groups;
pub mod guard;
pub mod publisher;
pub mod rdata;
pub mod record;
pub mod resolver;
pub mod traits;

// Re-export core types for convenience
pub use config::{DaemonConfig, PublisherConfig, RecordConfig};
pub use error::{Error, Result};
pub use groups::{GroupState, RecordGroup, RecordGroupManager};
pub use guard::{ConflictGuard, Verdict};
pub use publisher::Publisher;
pub use record::{DnsType, Record, RecordPayload, RecordScope, RecordType, ScopedIpv4};
pub use resolver::NameResolver;
pub use traits::{EntryGroup, InterfaceSource, NameDaemon, NetInterface};
