//! fio-bco-import - FIO statement import service
//!
//! Periodically downloads account statements from the FIO gateway and feeds
//! the extracted accounts and transactions to the vault and ledger services:
//!
//! ```text
//! ┌──────────┐    ┌───────────┐    ┌──────────────┐    ┌──────────────┐
//! │  Tokens  │───▶│  Gateway  │───▶│  Extraction  │───▶│ Vault/Ledger │
//! │ (store)  │    │  (REST)   │    │  (streams)   │    │   (REST)     │
//! └──────────┘    └───────────┘    └──────────────┘    └──────────────┘
//! ```

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use fio_bco::config::Config;
use fio_bco::fio::client::FioClient;
use fio_bco::logging::init_logging;
use fio_bco::metrics::Metrics;
use fio_bco::sync::{ImportWorker, MemoryTokenStore, RestPublisher};

// ============================================================
// ARGUMENTS
// ============================================================

/// Optional `--config <path>`; without it configuration comes from
/// `FIO_BCO_*` environment variables.
fn get_config_path() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
    }
    None
}

// ============================================================
// MAIN
// ============================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match get_config_path() {
        Some(path) => {
            Config::from_file(&path).with_context(|| format!("loading config from {path}"))?
        }
        None => Config::from_env().context("loading config from environment")?,
    };

    let _log_guard = init_logging(&config);
    info!(
        tenant = %config.tenant,
        version = env!("CARGO_PKG_VERSION"),
        git = env!("GIT_HASH"),
        "fio-bco-import starting"
    );

    let client = FioClient::new(&config.fio_gateway).context("building gateway client")?;
    let store = MemoryTokenStore::seeded(&config.tokens).context("seeding token store")?;
    let publisher = RestPublisher::new(&config.vault_gateway, &config.ledger_gateway, &config.tenant)
        .context("building downstream publisher")?;
    let metrics = Arc::new(Metrics::new());

    let worker = ImportWorker::new(
        client,
        store,
        publisher,
        config.tenant.clone(),
        config.sync_rate(),
        Arc::clone(&metrics),
    );

    tokio::select! {
        _ = worker.run() => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    let snapshot = metrics.snapshot();
    info!(
        statements = snapshot.statements_downloaded,
        accounts = snapshot.accounts_discovered,
        transactions = snapshot.transactions_imported,
        transfers = snapshot.transfers_imported,
        failures = snapshot.sync_failures,
        "fio-bco-import stopped"
    );
    Ok(())
}
