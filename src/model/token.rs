//! Gateway API tokens.
//!
//! A token grants read access to one bank account at the gateway. Values are
//! secrets; the type masks them in `Debug` and `Display` output so they never
//! reach logs, and exposes the raw value only through [`Token::value`].

use std::fmt;
use thiserror::Error;

/// Longest token value the gateway issues.
pub const MAX_TOKEN_LEN: usize = 128;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token value is empty")]
    Empty,
    #[error("Token value exceeds {MAX_TOKEN_LEN} characters")]
    TooLong,
    #[error("Token value contains characters outside [A-Za-z0-9]")]
    InvalidCharacter,
}

/// One gateway token together with its import cursor.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    /// Highest transfer id already imported for this token, `None` until the
    /// first statement lands.
    pub last_synced_id: Option<i64>,
}

impl Token {
    /// Validate and wrap a raw token value.
    pub fn new(value: impl Into<String>) -> Result<Self, TokenError> {
        let value = value.into();
        if value.is_empty() {
            return Err(TokenError::Empty);
        }
        if value.len() > MAX_TOKEN_LEN {
            return Err(TokenError::TooLong);
        }
        if !value.bytes().all(|b| b.is_ascii_alphanumeric()) {
            return Err(TokenError::InvalidCharacter);
        }
        Ok(Self {
            value,
            last_synced_id: None,
        })
    }

    /// Raw secret value, for request URLs only.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// First four characters followed by an ellipsis, safe to log.
    pub fn masked(&self) -> String {
        let head: String = self.value.chars().take(4).collect();
        format!("{head}...")
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &self.masked())
            .field("last_synced_id", &self.last_synced_id)
            .finish()
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.masked())
    }
}

// ============================================================
// Tests
// ============================================================
