// # ddnsd - DDNS Daemon
//
// Thin integration layer over ddns-core:
// 1. Reading the TOML configuration file
// 2. Initializing logging
// 3. Wiring the OpenDNS WAN IP source and the Cloudflare zone clients
// 4. Running the update loop until SIGINT/SIGTERM
//
// ## Configuration
//
// - `DDNS_CONFIG_PATH`: configuration file (default `ddns.toml`). A missing
//   file is replaced by a template and the daemon exits.
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn or error; overrides
//   `general.debug` from the file.
// - `general.log_file`: append logs to this file instead of stdout.
//
// ## Example
//
// ```bash
// export DDNS_CONFIG_PATH=/etc/ddns/ddns.toml
// ddnsd
// ```
//
// ## systemd
//
// Run with `Restart=on-failure` and `RestartPreventExitStatus=78` so that a
// configuration problem is not retried in a loop.

mod settings;

use anyhow::Result;
use ddns_core::{DdnsConfig, DdnsEngine};
use ddns_ip_opendns::OpenDnsWanIp;
use ddns_provider_cloudflare::CloudflareFactory;
use std::env;
use std::process::ExitCode;
use std::sync::Mutex;
use tracing::{error, info};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 78: Configuration error (EX_CONFIG, do not restart)
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
    /// Configuration error or startup failure
    ConfigError = 78,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn main() -> ExitCode {
    let path = settings::config_path(env::var_os(settings::CONFIG_PATH_ENV));

    let config = match settings::load(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let level_override = env::var(settings::LOG_LEVEL_ENV).ok();
    let log_level = match settings::log_level(&config.general, level_override.as_deref()) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let log_file = match config.general.log_file.as_deref().map(settings::open_log_file) {
        Some(Ok(file)) => Some(file),
        Some(Err(e)) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
        None => None,
    };

    let builder = FmtSubscriber::builder().with_max_level(log_level);
    let installed = match log_file {
        Some(file) => tracing::subscriber::set_global_default(
            builder.with_ansi(false).with_writer(Mutex::new(file)).finish(),
        ),
        None => tracing::subscriber::set_global_default(builder.finish()),
    };
    if let Err(e) = installed {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    // Panics end up in the log file too
    std::panic::set_hook(Box::new(|panic| {
        error!("Uncaught panic: {}", panic);
    }));

    info!(
        "Configuration loaded from {}: {} zone(s)",
        path.display(),
        config.zones.len()
    );

    // One thread of control: cycles never overlap
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        let engine = match build_engine(&config) {
            Ok(engine) => engine,
            Err(e) => {
                error!("Failed to start: {:#}", e);
                return DdnsExitCode::ConfigError;
            }
        };

        match run_daemon(engine).await {
            Ok(signal) => {
                info!("Received shutdown signal: {}", signal);
                info!("Shutting down daemon");
                DdnsExitCode::CleanShutdown
            }
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Wire the collaborators into an engine
fn build_engine(config: &DdnsConfig) -> Result<DdnsEngine> {
    let wan_ip = OpenDnsWanIp::new();
    let factory = CloudflareFactory::new();
    Ok(DdnsEngine::from_config(config, Box::new(wan_ip), &factory)?)
}

/// Run the update loop until a shutdown signal arrives
///
/// The loop is dropped mid-cycle on signal; nothing needs flushing.
async fn run_daemon(mut engine: DdnsEngine) -> Result<&'static str> {
    info!("Starting service...");

    tokio::select! {
        result = engine.run() => match result {
            Ok(()) => Err(anyhow::anyhow!("update loop stopped unexpectedly")),
            Err(e) => Err(e.into()),
        },
        signal = wait_for_shutdown() => signal,
    }
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
