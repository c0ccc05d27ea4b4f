//! FIO bank gateway: wire model, REST client and statement extraction.

pub mod client;
pub mod extract;
pub mod statement;

pub use client::{ClientError, FioClient, StatementSource};
pub use extract::{extract_accounts, extract_transactions, AccountStream, TransactionStream};
pub use statement::{AccountStatement, Column, FioStatement, StatementInfo, TransferRecord};
