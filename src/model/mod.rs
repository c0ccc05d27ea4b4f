//! Canonical domain entities shared across the service.

pub mod account;
pub mod iban;
pub mod token;
pub mod transaction;

pub use account::{Account, AccountFormat};
pub use iban::normalize_account_number;
pub use token::{Token, TokenError};
pub use transaction::{AccountPair, Transaction, Transfer};
