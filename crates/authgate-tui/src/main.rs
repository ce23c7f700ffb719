//! authgate TUI entry point.
//!
//! # Usage
//!
//! ```bash
//! # In-memory store, seeded with a credential
//! authgate-tui --token tok-123
//!
//! # Durable store, logging to a file
//! authgate-tui --store creds.redb --log-file authgate.log --log-level debug
//! ```

use std::sync::Arc;

use authgate_app::ProviderConfig;
use authgate_core::{CredentialStore, Token};
use authgate_store::{MemoryCredentialStore, RedbCredentialStore};
use authgate_tui::{
    AuthProvider, Runtime, TerminalDriver, TerminalError,
    cli::{self, Args, StoreKind},
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    cli::init_logging(&args)?;

    let config = args.provider_config();
    let token = args.token.as_deref();

    match args.store_kind() {
        StoreKind::Memory => run(MemoryCredentialStore::new(), config, token).await?,
        StoreKind::Redb(path) => {
            tracing::info!(path = %path.display(), "opening credential store");
            run(RedbCredentialStore::open(&path)?, config, token).await?;
        },
    }

    Ok(())
}

async fn run<S: CredentialStore>(
    store: S,
    config: ProviderConfig,
    token: Option<&str>,
) -> Result<(), TerminalError> {
    if let Some(raw) = token {
        store.write(&Token::parse(raw)?).await?;
        tracing::info!("credential store seeded");
    }

    let provider = Arc::new(AuthProvider::new(store, config));
    let driver = TerminalDriver::new()?;

    Runtime::new(driver, provider).run().await
}
