//! Downstream delivery boundary.
//!
//! Extracted entities go to two collaborators: accounts to the vault
//! service, transactions to the ledger service. Both endpoints are
//! idempotent, re-posting an entity they already hold answers 409 and
//! counts as success, which is what lets the import replay statements
//! after a crash.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;

use crate::model::account::Account;
use crate::model::transaction::Transaction;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Downstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Downstream refused {entity} with status {status}")]
    Rejected {
        entity: &'static str,
        status: StatusCode,
    },
}

/// Hands extracted entities to the downstream services.
#[async_trait]
pub trait StatementPublisher: Send + Sync {
    async fn publish_account(&self, account: &Account) -> Result<(), PublishError>;

    async fn publish_transaction(&self, transaction: &Transaction) -> Result<(), PublishError>;
}

/// REST implementation against the vault and ledger HTTP APIs.
pub struct RestPublisher {
    http: reqwest::Client,
    account_url: String,
    transaction_url: String,
}

impl RestPublisher {
    pub fn new(
        vault_gateway: &str,
        ledger_gateway: &str,
        tenant: &str,
    ) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            account_url: format!("{}/account/{}", vault_gateway.trim_end_matches('/'), tenant),
            transaction_url: format!(
                "{}/transaction/{}",
                ledger_gateway.trim_end_matches('/'),
                tenant
            ),
        })
    }
}

#[async_trait]
impl StatementPublisher for RestPublisher {
    async fn publish_account(&self, account: &Account) -> Result<(), PublishError> {
        let response = self.http.post(&self.account_url).json(account).send().await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Ok(()),
            status => Err(PublishError::Rejected {
                entity: "account",
                status,
            }),
        }
    }

    async fn publish_transaction(&self, transaction: &Transaction) -> Result<(), PublishError> {
        let response = self
            .http
            .post(&self.transaction_url)
            .json(transaction)
            .send()
            .await?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Ok(()),
            status => Err(PublishError::Rejected {
                entity: "transaction",
                status,
            }),
        }
    }
}

// ============================================================
// Tests
// ============================================================
