// # mpublisherd - mDNS Publisher Daemon
//
// The mpublisherd daemon is a thin integration layer around
// `mpublisher_core::Publisher`. It is responsible for:
// 1. Reading configuration from environment variables
// 2. Connecting to Avahi and publishing the configured names
// 3. Re-publishing everything when Avahi restarts
// 4. Withdrawing everything on SIGTERM/SIGINT
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `MPUBLISHER_CONFIG`: Path to a JSON configuration file; its records replace
//   `MPUBLISHER_NAMES`, `MPUBLISHER_RECORD_TYPE` and `MPUBLISHER_FORCE`
// - `MPUBLISHER_NAMES`: Comma-separated list of names to publish
// - `MPUBLISHER_RECORD_TYPE`: Record type for all names (cname, a)
// - `MPUBLISHER_FORCE`: Publish even if another host owns a name (true, false)
// - `MPUBLISHER_TTL`: Record TTL in seconds (also overrides the file)
// - `MPUBLISHER_CHECK_INTERVAL_SECS`: Seconds between Avahi liveness checks
//   (also overrides the file)
// - `MPUBLISHER_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export MPUBLISHER_NAMES=printer.local,nas.local
// export MPUBLISHER_TTL=120
//
// mpublisherd
// ```

use anyhow::Result;
use mpublisher_avahi::AvahiDaemon;
use mpublisher_core::{DaemonConfig, Publisher, PublisherConfig, RecordConfig, RecordType};
use mpublisher_ifaddrs::IfAddrsSource;
use std::env;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum PublisherExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<PublisherExitCode> for ExitCode {
    fn from(code: PublisherExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    config_path: Option<String>,
    names: Vec<String>,
    record_type: RecordType,
    force: bool,
    ttl: Option<u32>,
    check_interval_secs: Option<u64>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a variable lookup function
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let record_type = match lookup("MPUBLISHER_RECORD_TYPE") {
            Some(s) => s.parse::<RecordType>()?,
            None => RecordType::Cname,
        };

        let force = match lookup("MPUBLISHER_FORCE").as_deref() {
            None | Some("") | Some("0") | Some("false") | Some("no") => false,
            Some("1") | Some("true") | Some("yes") => true,
            Some(other) => anyhow::bail!(
                "MPUBLISHER_FORCE '{}' is not a boolean (true, false)",
                other
            ),
        };

        let ttl = lookup("MPUBLISHER_TTL")
            .map(|s| s.parse::<u32>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("MPUBLISHER_TTL is not a number: {}", e))?;

        let check_interval_secs = lookup("MPUBLISHER_CHECK_INTERVAL_SECS")
            .map(|s| s.parse::<u64>())
            .transpose()
            .map_err(|e| anyhow::anyhow!("MPUBLISHER_CHECK_INTERVAL_SECS is not a number: {}", e))?;

        Ok(Self {
            config_path: lookup("MPUBLISHER_CONFIG").filter(|s| !s.is_empty()),
            names: lookup("MPUBLISHER_NAMES")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            record_type,
            force,
            ttl,
            check_interval_secs,
            log_level: lookup("MPUBLISHER_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the variables that are not covered by `DaemonConfig`
    fn validate(&self) -> Result<()> {
        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "MPUBLISHER_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        if self.config_path.is_none() && self.names.is_empty() {
            anyhow::bail!(
                "MPUBLISHER_NAMES must contain at least one name. \
                Set it via: export MPUBLISHER_NAMES=printer.local,nas.local"
            );
        }

        Ok(())
    }

    /// Build the daemon configuration, from file or from the variables
    ///
    /// `MPUBLISHER_TTL` and `MPUBLISHER_CHECK_INTERVAL_SECS` apply on top of
    /// a configuration file.
    fn daemon_config(&self) -> Result<DaemonConfig> {
        let mut config = match &self.config_path {
            Some(path) => DaemonConfig::from_json_file(path)?,
            None => DaemonConfig::new(
                self.names
                    .iter()
                    .map(|name| {
                        RecordConfig::new(name.as_str())
                            .with_record_type(self.record_type)
                            .with_force(self.force)
                    })
                    .collect(),
            ),
        };

        if let Some(ttl) = self.ttl {
            config.publisher.ttl_secs = ttl;
        }
        if let Some(interval) = self.check_interval_secs {
            config.check_interval_secs = interval;
        }

        config.validate()?;
        Ok(config)
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return PublisherExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return PublisherExitCode::ConfigError.into();
    }

    let daemon_config = match config.daemon_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {}", e);
            return PublisherExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return PublisherExitCode::ConfigError.into();
    }

    info!("Starting mpublisherd");
    info!("Configuration loaded: {} name(s)", daemon_config.records.len());

    let publisher = match connect(&daemon_config.publisher) {
        Ok(publisher) => publisher,
        Err(e) => {
            error!("Failed to connect to Avahi: {}", e);
            return PublisherExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return PublisherExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(publisher, daemon_config).await {
            error!("Daemon error: {}", e);
            PublisherExitCode::RuntimeError
        } else {
            PublisherExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Connect to Avahi on the system bus
fn connect(config: &PublisherConfig) -> mpublisher_core::Result<Publisher> {
    let daemon = AvahiDaemon::connect()?;
    Publisher::new(
        Box::new(daemon),
        Box::new(IfAddrsSource::new()),
        config.clone(),
    )
}

/// Publish every configured name, returning how many succeeded
fn publish_all(publisher: &mut Publisher, records: &[RecordConfig]) -> usize {
    let mut published = 0;
    for record in records {
        match publisher.publish(&record.name, record.force, record.record_type) {
            Ok(true) => published += 1,
            Ok(false) => warn!("Could not publish '{}'", record.name),
            Err(e) => error!("Failed to publish '{}': {}", record.name, e),
        }
    }
    info!("Publishing {}/{} name(s) as {}", published, records.len(), publisher.identity());
    published
}

/// Check that Avahi is still there, reconnecting and re-publishing if it came back
///
/// A publisher is dropped when Avahi stops answering or when a new Avahi
/// process took over the bus name, since either way our groups are gone.
fn supervise<F>(slot: &mut Option<Publisher>, config: &DaemonConfig, connect: F)
where
    F: Fn(&PublisherConfig) -> mpublisher_core::Result<Publisher>,
{
    let lost = slot.as_ref().map(|publisher| {
        if !publisher.available() {
            warn!("Avahi is gone, waiting for it to come back");
            true
        } else if publisher.restarted() {
            warn!("Avahi restarted, re-publishing");
            true
        } else {
            false
        }
    });

    match lost {
        Some(false) => return,
        // Avahi forgot our groups already; dropping only closes the connection
        Some(true) => *slot = None,
        None => {}
    }

    match connect(&config.publisher) {
        Ok(mut publisher) => {
            info!("Avahi is back, re-publishing");
            publish_all(&mut publisher, &config.records);
            *slot = Some(publisher);
        }
        Err(e) => debug!("Avahi still unavailable: {}", e),
    }
}

/// Run the daemon
async fn run_daemon(publisher: Publisher, config: DaemonConfig) -> Result<()> {
    let mut slot = Some(publisher);
    if let Some(publisher) = slot.as_mut() {
        tokio::task::block_in_place(|| publish_all(publisher, &config.records));
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(config.check_interval_secs));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // The first tick completes immediately
    ticker.tick().await;

    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    let result = loop {
        tokio::select! {
            signal = &mut shutdown => {
                match signal {
                    Ok(signal) => {
                        info!("Received shutdown signal: {}", signal);
                        break Ok(());
                    }
                    Err(e) => {
                        error!("Shutdown error: {}", e);
                        break Err(e);
                    }
                }
            }

            _ = ticker.tick() => {
                tokio::task::block_in_place(|| supervise(&mut slot, &config, connect));
            }
        }
    };

    info!("Withdrawing published names");
    tokio::task::block_in_place(|| drop(slot.take()));

    result
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let signal = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(signal)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
