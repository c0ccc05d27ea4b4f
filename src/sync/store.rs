//! Token persistence boundary.
//!
//! Production deployments keep tokens in encrypted storage owned by another
//! service; the import worker only depends on this trait. The in-memory
//! implementation backs tests and single-process setups, its state is lost
//! on restart.

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::model::token::{Token, TokenError};

/// Where tokens and their import cursors live.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// All registered tokens, cursors included.
    async fn tokens(&self) -> Vec<Token>;

    /// Record that everything up to `id` has been imported for `token`.
    async fn advance_cursor(&self, token: &Token, id: i64);
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<Vec<Token>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding one fresh token per configured value.
    pub fn seeded(values: &[String]) -> Result<Self, TokenError> {
        let tokens = values
            .iter()
            .map(Token::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            tokens: Mutex::new(tokens),
        })
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn tokens(&self) -> Vec<Token> {
        self.tokens.lock().await.clone()
    }

    async fn advance_cursor(&self, token: &Token, id: i64) {
        let mut tokens = self.tokens.lock().await;
        if let Some(stored) = tokens.iter_mut().find(|t| t.value() == token.value()) {
            stored.last_synced_id = Some(id);
        }
    }
}

// ============================================================
// Tests
// ============================================================
