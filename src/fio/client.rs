//! FIO gateway REST client.
//!
//! Two calls per sync: move the server-side download cursor, then fetch
//! everything after it as one statement. The gateway enforces a rate window
//! per token and answers 409 while it is open.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use crate::fio::statement::FioStatement;
use crate::model::token::Token;

/// One statement download per token per 20 seconds.
const RATE_WINDOW: Duration = Duration::from_secs(20);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Cursor date requested for tokens that have never synced, far enough back
/// to cover any account history the gateway holds.
const EPOCH_DATE: &str = "1900-01-01";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Gateway request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("Gateway refused request with status {0}")]
    Gateway(StatusCode),
    #[error("Gateway rate window still open")]
    RateLimited,
}

// request URLs embed the raw token value, transport errors must not carry them
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.without_url())
    }
}

/// Where statements come from.
///
/// The worker drives this trait so tests can feed it canned statements
/// without a live gateway.
#[async_trait]
pub trait StatementSource: Send + Sync {
    /// Position the download cursor for `token` right after `last_synced_id`,
    /// or at the beginning of history when the token never synced.
    async fn set_cursor(&self, token: &Token, last_synced_id: Option<i64>)
        -> Result<(), ClientError>;

    /// Download everything after the cursor as one statement.
    async fn last_statement(&self, token: &Token) -> Result<FioStatement, ClientError>;
}

/// HTTP implementation of [`StatementSource`] against the real gateway.
pub struct FioClient {
    base_url: String,
    http: reqwest::Client,
}

impl FioClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url: String = base_url.into();
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn cursor_url(&self, token: &Token, last_synced_id: Option<i64>) -> String {
        match last_synced_id {
            Some(id) => format!("{}/set-last-id/{}/{}/", self.base_url, token.value(), id),
            None => format!(
                "{}/set-last-date/{}/{}/",
                self.base_url,
                token.value(),
                EPOCH_DATE
            ),
        }
    }

    fn statement_url(&self, token: &Token) -> String {
        format!("{}/last/{}/transactions.json", self.base_url, token.value())
    }

    async fn fetch_statement(&self, token: &Token) -> Result<FioStatement, ClientError> {
        let response = self.http.get(self.statement_url(token)).send().await?;
        match response.status() {
            StatusCode::CONFLICT => Err(ClientError::RateLimited),
            status if !status.is_success() => Err(ClientError::Gateway(status)),
            _ => Ok(response.json::<FioStatement>().await?),
        }
    }
}

#[async_trait]
impl StatementSource for FioClient {
    async fn set_cursor(
        &self,
        token: &Token,
        last_synced_id: Option<i64>,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .get(self.cursor_url(token, last_synced_id))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Gateway(status));
        }
        Ok(())
    }

    async fn last_statement(&self, token: &Token) -> Result<FioStatement, ClientError> {
        match self.fetch_statement(token).await {
            // one retry after the rate window passes, a second 409 is final
            Err(ClientError::RateLimited) => {
                warn!(token = %token, "Gateway rate window open, retrying in {:?}", RATE_WINDOW);
                tokio::time::sleep(RATE_WINDOW).await;
                self.fetch_statement(token).await
            }
            outcome => outcome,
        }
    }
}

// ============================================================
// Tests
// ============================================================
