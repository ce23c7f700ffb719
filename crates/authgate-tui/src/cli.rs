//! Command-line arguments and process setup.

use std::{fs::File, io, path::PathBuf, sync::Mutex, time::Duration};

use authgate_app::ProviderConfig;
use authgate_core::LogoutPolicy;
use clap::Parser;
use thiserror::Error;
use tracing_subscriber::{
    EnvFilter,
    util::{SubscriberInitExt, TryInitError},
};

/// Logging could not be set up.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// Log file could not be created.
    #[error("cannot create log file: {0}")]
    Io(#[from] io::Error),

    /// A global subscriber is already installed.
    #[error("cannot install tracing subscriber: {0}")]
    Subscriber(#[from] TryInitError),
}

/// authgate terminal UI
#[derive(Parser, Debug)]
#[command(name = "authgate-tui")]
#[command(about = "Session gate with guarded navigation stacks")]
#[command(version)]
pub struct Args {
    /// Path to a redb credential store
    ///
    /// If not provided, credentials are kept in memory and lost on exit.
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// Write logs to this file (logging is disabled otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` overrides it.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Credential check timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub check_timeout_ms: u64,

    /// Login/logout store timeout in milliseconds
    #[arg(long, default_value = "10000")]
    pub operation_timeout_ms: u64,

    /// What a failed logout does to the local session (strict, clear-locally)
    #[arg(long, default_value = "strict")]
    pub logout_policy: LogoutPolicy,

    /// Seed the store with this credential before the first check
    #[arg(long)]
    pub token: Option<String>,
}

/// Which credential store to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreKind {
    /// Volatile in-memory store.
    Memory,
    /// Durable redb file.
    Redb(PathBuf),
}

impl Args {
    /// Provider configuration from the timeout and policy flags.
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::default()
            .with_check_timeout(Duration::from_millis(self.check_timeout_ms))
            .with_operation_timeout(Duration::from_millis(self.operation_timeout_ms))
            .with_logout_policy(self.logout_policy)
    }

    /// Store selected by `--store`.
    pub fn store_kind(&self) -> StoreKind {
        self.store.clone().map_or(StoreKind::Memory, StoreKind::Redb)
    }
}

/// Install the tracing subscriber writing to `--log-file`.
///
/// The terminal is owned by the UI, so without a log file nothing is
/// installed.
///
/// # Errors
///
/// - `LoggingError::Io` if the log file cannot be created
/// - `LoggingError::Subscriber` if a global subscriber is already set
pub fn init_logging(args: &Args) -> Result<(), LoggingError> {
    let Some(path) = &args.log_file else {
        return Ok(());
    };

    let file = File::create(path)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .finish()
        .try_init()?;
    Ok(())
}
