//! fio-bco - FIO bank gateway connector
//!
//! Imports account statements from the FIO gateway and turns them into
//! canonical accounts and transactions for the downstream vault and ledger
//! services.
//!
//! # Modules
//!
//! - [`model`] - Canonical entities, account normalization, gateway tokens
//! - [`fio`] - Gateway wire model, REST client, statement extraction
//! - [`sync`] - Polling import worker and collaborator boundaries
//! - [`messages`] - Token lifecycle wire protocol
//! - [`config`] - Service configuration (yaml file or environment)
//! - [`logging`] - Tracing subscriber setup
//! - [`metrics`] - Import counters

// Domain entities - everything else builds on these
pub mod model;

// Gateway side
pub mod fio;

// Import side
pub mod sync;

// Service plumbing
pub mod config;
pub mod logging;
pub mod messages;
pub mod metrics;

// Convenient re-exports at crate root
pub use config::{Config, ConfigError};
pub use fio::client::{ClientError, FioClient, StatementSource};
pub use fio::extract::{
    extract_accounts, extract_transactions, AccountStream, ExtractStream, TransactionStream,
};
pub use fio::statement::{FioStatement, StatementInfo, TransferRecord};
pub use messages::{ProtocolError, TokenRequest, TokenResponse};
pub use metrics::{Metrics, MetricsSnapshot};
pub use model::account::{Account, AccountFormat};
pub use model::iban::normalize_account_number;
pub use model::token::{Token, TokenError};
pub use model::transaction::{AccountPair, Transaction, Transfer};
pub use sync::{
    ImportError, ImportWorker, MemoryTokenStore, PublishError, RestPublisher, StatementPublisher,
    SyncStats, TokenStore,
};
