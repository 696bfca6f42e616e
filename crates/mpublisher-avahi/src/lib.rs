// # Avahi Name Daemon
//
// This crate provides the Avahi backend for the mDNS publisher, talking to
// `avahi-daemon` over the D-Bus system bus.
//
// ## Constraints
//
// - One D-Bus call per trait method; no retries, no caching
// - No caller-side timeouts (the D-Bus defaults apply)
// - Errors are mapped to `Error::Transport`; the publisher decides how to
//   surface them
//
// ## D-Bus Reference
//
// - Server: `org.freedesktop.Avahi.Server` at `/` on `org.freedesktop.Avahi`
//   - `GetHostNameFqdn() -> s`
//   - `GetVersionString() -> s`
//   - `ResolveHostName(i interface, i protocol, s name, i aprotocol, u flags)
//      -> (i, i, s name, i, s address, u)`
//   - `EntryGroupNew() -> o`
// - Entry group: `org.freedesktop.Avahi.EntryGroup` at the returned path
//   - `AddRecord(i interface, i protocol, u flags, s name, q class, q type, u ttl, ay rdata)`
//   - `Commit()`, `Reset()`
// - Bus daemon: `org.freedesktop.DBus.GetNameOwner(s name) -> s`
//   identifies the running `avahi-daemon` process by its unique name

use mpublisher_core::record::DNS_CLASS_IN;
use mpublisher_core::traits::{EntryGroup, NameDaemon};
use mpublisher_core::{Error, Record, RecordScope, Result};
use tracing::debug;
use zbus::blocking::Connection;
use zbus::blocking::fdo::DBusProxy;
use zbus::names::BusName;
use zbus::proxy;
use zbus::zvariant::OwnedObjectPath;

/// Avahi bus name
pub const DBUS_NAME: &str = "org.freedesktop.Avahi";

/// Any interface
pub const IF_UNSPEC: i32 = -1;

/// Any protocol
pub const PROTO_UNSPEC: i32 = -1;

/// IPv4
pub const PROTO_INET: i32 = 0;

/// Allow several records with the same name and type in one group
pub const PUBLISH_ALLOW_MULTIPLE: u32 = 8;

#[proxy(
    interface = "org.freedesktop.Avahi.Server",
    default_service = "org.freedesktop.Avahi",
    default_path = "/"
)]
trait AvahiServer {
    fn get_host_name_fqdn(&self) -> zbus::Result<String>;

    fn get_version_string(&self) -> zbus::Result<String>;

    fn resolve_host_name(
        &self,
        interface: i32,
        protocol: i32,
        name: &str,
        aprotocol: i32,
        flags: u32,
    ) -> zbus::Result<(i32, i32, String, i32, String, u32)>;

    fn entry_group_new(&self) -> zbus::Result<OwnedObjectPath>;
}

#[proxy(
    interface = "org.freedesktop.Avahi.EntryGroup",
    default_service = "org.freedesktop.Avahi"
)]
trait AvahiEntryGroup {
    fn add_record(
        &self,
        interface: i32,
        protocol: i32,
        flags: u32,
        name: &str,
        clazz: u16,
        type_: u16,
        ttl: u32,
        rdata: &[u8],
    ) -> zbus::Result<()>;

    fn commit(&self) -> zbus::Result<()>;

    fn reset(&self) -> zbus::Result<()>;
}

/// Map a D-Bus failure to a transport error
fn transport(e: zbus::Error) -> Error {
    Error::transport(e.to_string())
}

/// Interface, protocol and publish flags for a record
///
/// Records scoped to an interface are published over IPv4 only.
pub fn record_target(record: &Record) -> Result<(i32, i32, u32)> {
    let (interface, protocol) = match record.scope {
        RecordScope::Any => (IF_UNSPEC, PROTO_UNSPEC),
        RecordScope::Interface(index) => {
            let index = i32::try_from(index).map_err(|_| {
                Error::invalid_argument(format!("interface index {} out of range", index))
            })?;
            (index, PROTO_INET)
        }
    };

    let flags = if record.allow_multiple {
        PUBLISH_ALLOW_MULTIPLE
    } else {
        0
    };

    Ok((interface, protocol, flags))
}

/// Connection to `avahi-daemon` on the system bus
pub struct AvahiDaemon {
    connection: Connection,
    server: AvahiServerProxyBlocking<'static>,
}

impl std::fmt::Debug for AvahiDaemon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvahiDaemon")
            .field("unique_name", &self.connection.unique_name())
            .finish_non_exhaustive()
    }
}

impl AvahiDaemon {
    /// Open a private connection to the system bus
    ///
    /// # Returns
    ///
    /// - `Ok(AvahiDaemon)`: Connected (Avahi itself may still be absent)
    /// - `Err(Error::Connect)`: The system bus is unreachable
    pub fn connect() -> Result<Self> {
        let connection = Connection::system()
            .map_err(|e| Error::connect(format!("system bus unavailable: {}", e)))?;
        Self::with_connection(connection)
    }

    /// Use an existing bus connection
    pub fn with_connection(connection: Connection) -> Result<Self> {
        let server = AvahiServerProxyBlocking::new(&connection)
            .map_err(|e| Error::connect(format!("failed to create Avahi proxy: {}", e)))?;
        debug!("Connected to the D-Bus system bus for {}", DBUS_NAME);
        Ok(Self { connection, server })
    }
}

impl NameDaemon for AvahiDaemon {
    fn host_name_fqdn(&self) -> Result<String> {
        self.server.get_host_name_fqdn().map_err(transport)
    }

    fn resolve_host_name(&self, name: &str) -> Result<String> {
        let (_, _, owner, _, _, _) = self
            .server
            .resolve_host_name(IF_UNSPEC, PROTO_UNSPEC, name, PROTO_UNSPEC, 0)
            .map_err(transport)?;
        Ok(owner)
    }

    fn entry_group_new(&self) -> Result<Box<dyn EntryGroup>> {
        let path = self.server.entry_group_new().map_err(transport)?;
        debug!("Created entry group {}", path.as_str());

        let proxy = AvahiEntryGroupProxyBlocking::builder(&self.connection)
            .path(path.into_inner())
            .and_then(|builder| builder.build())
            .map_err(transport)?;

        Ok(Box::new(AvahiGroup { proxy }))
    }

    fn version_string(&self) -> Result<String> {
        self.server.get_version_string().map_err(transport)
    }

    fn instance_id(&self) -> Result<Option<String>> {
        let name = BusName::try_from(DBUS_NAME).map_err(|e| Error::transport(e.to_string()))?;
        let owner = DBusProxy::new(&self.connection)
            .map_err(transport)?
            .get_name_owner(name)
            .map_err(|e| Error::transport(e.to_string()))?;
        Ok(Some(owner.to_string()))
    }

    fn close(&self) -> Result<()> {
        self.connection.clone().close().map_err(transport)
    }
}

/// One Avahi entry group
pub struct AvahiGroup {
    proxy: AvahiEntryGroupProxyBlocking<'static>,
}

impl EntryGroup for AvahiGroup {
    fn add_record(&self, record: &Record) -> Result<()> {
        let (interface, protocol, flags) = record_target(record)?;
        self.proxy
            .add_record(
                interface,
                protocol,
                flags,
                &record.name,
                DNS_CLASS_IN,
                record.dns_type.code(),
                record.ttl,
                &record.rdata,
            )
            .map_err(transport)
    }

    fn commit(&self) -> Result<()> {
        self.proxy.commit().map_err(transport)
    }

    fn reset(&self) -> Result<()> {
        self.proxy.reset().map_err(transport)
    }
}
