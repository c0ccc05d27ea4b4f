//! Discovered account entities published to the vault service.

use serde::Serialize;
use std::fmt;

/// Tag describing how far normalization got with an account name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountFormat {
    /// The name was rewritten into a canonical IBAN.
    Iban,
    /// The name is whatever the gateway supplied, kept verbatim.
    FioUnknown,
}

impl AccountFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountFormat::Iban => "IBAN",
            AccountFormat::FioUnknown => "FIO_UNKNOWN",
        }
    }
}

impl fmt::Display for AccountFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An account referenced by a statement, credited or debited by at least
/// one transfer or owning the statement itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub name: String,
    pub format: AccountFormat,
    /// Statement currency, e.g. `CZK`.
    pub currency: String,
    pub is_balance_check: bool,
}

impl Account {
    pub fn new(name: impl Into<String>, format: AccountFormat, currency: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            format,
            currency: currency.into(),
            is_balance_check: false,
        }
    }
}

// ============================================================
// Tests
// ============================================================
