//! Statement import worker.
//!
//! On a fixed cadence the worker walks every registered token, downloads
//! whatever the gateway accumulated since the token's cursor and feeds the
//! extracted entities downstream. Accounts go first, the ledger refuses
//! transfers against accounts it has never seen. A token's cursor only
//! moves after its whole statement is delivered, so a crash mid-pass replays
//! the statement and the idempotent downstream makes the replay harmless.

pub mod publisher;
pub mod store;

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info};

use crate::fio::client::{ClientError, StatementSource};
use crate::fio::extract::{extract_accounts, extract_transactions};
use crate::metrics::Metrics;
use crate::model::token::Token;

pub use publisher::{PublishError, RestPublisher, StatementPublisher};
pub use store::{MemoryTokenStore, TokenStore};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Publish(#[from] PublishError),
}

/// Counters for one synchronization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub tokens: u64,
    pub statements: u64,
    pub accounts: u64,
    pub transactions: u64,
    pub transfers: u64,
    pub failures: u64,
}

/// Imports statements for every registered token on a fixed cadence.
pub struct ImportWorker<C, S, P> {
    pub source: C,
    pub store: S,
    pub publisher: P,
    pub metrics: Arc<Metrics>,
    tenant: String,
    sync_rate: Duration,
}

impl<C, S, P> ImportWorker<C, S, P>
where
    C: StatementSource,
    S: TokenStore,
    P: StatementPublisher,
{
    pub fn new(
        source: C,
        store: S,
        publisher: P,
        tenant: impl Into<String>,
        sync_rate: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            source,
            store,
            publisher,
            metrics,
            tenant: tenant.into(),
            sync_rate,
        }
    }

    /// Run sync passes forever. A failing token never aborts the pass and a
    /// failing pass never aborts the worker.
    pub async fn run(&self) {
        info!(
            tenant = %self.tenant,
            "Import worker started, syncing every {:?}",
            self.sync_rate
        );
        loop {
            let stats = self.sync_once().await;
            info!(
                tokens = stats.tokens,
                statements = stats.statements,
                accounts = stats.accounts,
                transactions = stats.transactions,
                transfers = stats.transfers,
                failures = stats.failures,
                "Sync pass finished"
            );
            sleep(self.sync_rate).await;
        }
    }

    /// One pass over all registered tokens.
    pub async fn sync_once(&self) -> SyncStats {
        let mut stats = SyncStats::default();
        for token in self.store.tokens().await {
            stats.tokens += 1;
            if let Err(err) = self.sync_token(&token, &mut stats).await {
                stats.failures += 1;
                self.metrics.sync_failed();
                error!(token = %token, "Statement import failed: {err}");
            }
        }
        stats
    }

    async fn sync_token(&self, token: &Token, stats: &mut SyncStats) -> Result<(), ImportError> {
        self.source.set_cursor(token, token.last_synced_id).await?;
        let statement = Arc::new(self.source.last_statement(token).await?);
        self.metrics.statement_downloaded();
        stats.statements += 1;
        info!(
            token = %token,
            iban = %statement.info().iban,
            "Downloaded statement with {} transfer records",
            statement.transfers().len()
        );

        let mut accounts = extract_accounts(Some(Arc::clone(&statement)));
        while let Some(account) = accounts.next().await {
            self.publisher.publish_account(&account).await?;
            self.metrics.account_discovered();
            stats.accounts += 1;
        }

        let mut transactions = extract_transactions(Some(Arc::clone(&statement)), &self.tenant);
        while let Some(transaction) = transactions.next().await {
            let transfers = transaction.transfers.len() as u64;
            self.publisher.publish_transaction(&transaction).await?;
            self.metrics.transaction_imported(transfers);
            stats.transactions += 1;
            stats.transfers += transfers;
        }

        if let Some(id) = statement.max_transfer_id() {
            self.store.advance_cursor(token, id).await;
            info!(token = %token, "Cursor advanced to {id}");
        }
        Ok(())
    }
}

// ============================================================
// Tests
// ============================================================
