//! Canonical transaction entities published to the ledger service.

use serde::{Serialize, Serializer};

/// Reference to a tenant-scoped account, as transfer legs carry it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AccountPair {
    pub tenant: String,
    pub name: String,
}

impl AccountPair {
    pub fn new(tenant: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tenant: tenant.into(),
            name: name.into(),
        }
    }
}

/// One movement of funds between a credit and a debit account.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    /// Source transfer id, unique within the bank account.
    pub id: String,
    pub credit: AccountPair,
    pub debit: AccountPair,
    /// ISO-8601 UTC timestamp, e.g. `2016-06-22T14:00:00Z`.
    pub value_date: String,
    /// Absolute amount, the credit/debit split already encodes the sign.
    #[serde(serialize_with = "amount_as_string")]
    pub amount: f64,
    pub currency: String,
}

/// A group of transfers booked together under one transaction id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub id: String,
    pub transfers: Vec<Transfer>,
}

/// The ledger wire format carries amounts as decimal strings.
fn amount_as_string<S>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(amount)
}

// ============================================================
// Tests
// ============================================================
