//! Statement extraction: gateway records to canonical entities.
//!
//! Each extractor makes one forward pass over a statement's transfer records
//! on a background task and hands results to the caller through a capacity-1
//! channel, so at most one item ever sits buffered between producer and
//! consumer. Dropping or closing the stream fails the producer's next send
//! and the task returns, which lets a consumer stop early without leaking
//! the pass.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use chrono::{DateTime, Utc};
use futures::Stream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::fio::statement::{FioStatement, StatementInfo, TransferRecord};
use crate::model::account::{Account, AccountFormat};
use crate::model::iban::normalize_account_number;
use crate::model::transaction::{AccountPair, Transaction, Transfer};

/// Value dates land downstream as ISO-8601 UTC seconds.
const VALUE_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub type TransactionStream = ExtractStream<Transaction>;
pub type AccountStream = ExtractStream<Account>;

// ============================================================
// Extraction streams
// ============================================================

/// Pull side of one extraction pass.
pub struct ExtractStream<T> {
    rx: mpsc::Receiver<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> ExtractStream<T> {
    fn spawn<F, Fut>(produce: F) -> Self
    where
        F: FnOnce(mpsc::Sender<T>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(1);
        let task = tokio::spawn(produce(tx));
        Self { rx, task }
    }

    /// Next extracted item, `None` once the pass is exhausted.
    pub async fn next(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Stop consuming early.
    ///
    /// The producing task observes the closed channel on its next send and
    /// returns. An item already buffered can still be drained via [`next`].
    ///
    /// [`next`]: ExtractStream::next
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// True once the producing task has returned.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<T> Stream for ExtractStream<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

// ============================================================
// Transfer extraction
// ============================================================

/// Turn a statement into transactions, grouping adjacent records that share
/// one transfer sequence id.
///
/// Records missing either the amount or the sequence id are skipped. An
/// absent statement yields an empty stream.
pub fn extract_transactions(
    statement: Option<Arc<FioStatement>>,
    tenant: &str,
) -> TransactionStream {
    let tenant = tenant.to_string();
    ExtractStream::spawn(move |tx| async move {
        let Some(statement) = statement else { return };
        run_transaction_pass(&statement, &tenant, tx).await;
    })
}

async fn run_transaction_pass(
    statement: &FioStatement,
    tenant: &str,
    tx: mpsc::Sender<Transaction>,
) {
    let info = statement.info();
    // one wall-clock fallback per pass, shared by every dateless record
    let now = Utc::now();

    let mut current_id: Option<String> = None;
    let mut buffer: Vec<Transfer> = Vec::new();

    for record in statement.transfers() {
        let (Some(transfer_id), Some(amount)) = (record.transfer_id(), record.amount()) else {
            continue;
        };

        let counter_party = resolve_counter_party(record, info);
        let (credit, debit) = if amount > 0.0 {
            (info.iban.clone(), counter_party)
        } else {
            (counter_party, info.iban.clone())
        };

        let value_date = record
            .value_date_raw()
            .and_then(parse_value_date)
            .unwrap_or(now);

        let record_key = format!("{}{}", info.iban, transfer_id);
        match &current_id {
            Some(previous) if *previous != record_key => {
                // the adjacent run under the previous id is complete
                let transaction = Transaction {
                    id: previous.clone(),
                    transfers: std::mem::take(&mut buffer),
                };
                if tx.send(transaction).await.is_err() {
                    return;
                }
                current_id = Some(record_key);
            }
            Some(_) => {}
            None => current_id = Some(record_key),
        }

        buffer.push(Transfer {
            id: transfer_id.to_string(),
            credit: AccountPair::new(tenant, credit),
            debit: AccountPair::new(tenant, debit),
            value_date: value_date.format(VALUE_DATE_FORMAT).to_string(),
            amount: amount.abs(),
            currency: info.currency.clone(),
        });
    }

    if let Some(id) = current_id {
        // buffer cannot be empty here, every id change flushed then refilled
        let _ = tx
            .send(Transaction {
                id,
                transfers: buffer,
            })
            .await;
    }
}

// ============================================================
// Account extraction
// ============================================================

/// Turn a statement into the set of accounts it references, the statement's
/// own account included.
///
/// An absent statement yields an empty stream.
pub fn extract_accounts(statement: Option<Arc<FioStatement>>) -> AccountStream {
    ExtractStream::spawn(move |tx| async move {
        let Some(statement) = statement else { return };
        run_account_pass(&statement, tx).await;
    })
}

async fn run_account_pass(statement: &FioStatement, tx: mpsc::Sender<Account>) {
    let info = statement.info();

    // last record per raw counter-party identifier wins
    let mut by_raw_name: HashMap<&str, &TransferRecord> = HashMap::new();
    for record in statement.transfers() {
        let raw = record.counter_party().unwrap_or(info.bic.as_str());
        by_raw_name.insert(raw, record);
    }

    let mut emitted: HashSet<String> = HashSet::new();
    for (raw, record) in &by_raw_name {
        let normalized = normalize_account_number(
            raw,
            record.counter_party_bank_code().unwrap_or(""),
            &info.bank_id,
        );
        let format = if normalized != *raw {
            AccountFormat::Iban
        } else {
            AccountFormat::FioUnknown
        };
        if emitted.contains(&normalized) {
            continue;
        }
        let account = Account::new(normalized.clone(), format, info.currency.clone());
        if tx.send(account).await.is_err() {
            return;
        }
        emitted.insert(normalized);
    }

    if !emitted.contains(&info.iban) {
        let own = Account::new(info.iban.clone(), AccountFormat::Iban, info.currency.clone());
        let _ = tx.send(own).await;
    }
}

// ============================================================
// Record helpers
// ============================================================

/// Counter-party identifier of one record. Records without a counter-account,
/// typically fees and card settlements, fall back to the statement's own BIC.
fn resolve_counter_party(record: &TransferRecord, info: &StatementInfo) -> String {
    match record.counter_party() {
        None => info.bic.clone(),
        Some(account) => normalize_account_number(
            account,
            record.counter_party_bank_code().unwrap_or(""),
            &info.bank_id,
        ),
    }
}

/// Parse the gateway value date, `YYYY-MM-DD` directly followed by a zone
/// offset, into UTC. Returns `None` when either part is unusable.
fn parse_value_date(raw: &str) -> Option<DateTime<Utc>> {
    if raw.len() < 11 || !raw.is_char_boundary(10) {
        return None;
    }
    let (date, offset) = raw.split_at(10);
    let stamped = format!("{date}T00:00:00{offset}");
    DateTime::parse_from_str(&stamped, "%Y-%m-%dT%H:%M:%S%z")
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fio::statement::{AccountStatement, Column, TransferList};

    fn statement(records: Vec<TransferRecord>) -> Option<Arc<FioStatement>> {
        Some(Arc::new(FioStatement {
            account_statement: AccountStatement {
                info: StatementInfo {
                    account_id: "2400222233".to_string(),
                    bank_id: "2010".to_string(),
                    currency: "CZK".to_string(),
                    iban: "CZ9620100000002400222233".to_string(),
                    bic: "FIOBCZPPXXX".to_string(),
                    opening_balance: 0.0,
                    closing_balance: 0.0,
                    id_from: None,
                    id_to: None,
                    id_last_download: None,
                },
                transaction_list: TransferList { transfers: records },
            },
        }))
    }

    fn record(transfer_id: Option<i64>, amount: Option<f64>, counter: Option<&str>) -> TransferRecord {
        TransferRecord {
            column0: Some(Column::new("2016-06-22+0200".to_string())),
            column1: amount.map(Column::new),
            column2: counter.map(|c| Column::new(c.to_string())),
            column3: Some(Column::new("0800".to_string())),
            column22: transfer_id.map(Column::new),
            ..TransferRecord::default()
        }
    }

    async fn collect<T>(mut stream: ExtractStream<T>) -> Vec<T>
    where
        T: Send + 'static,
    {
        let mut items = Vec::new();
        while let Some(item) = stream.next().await {
            items.push(item);
        }
        items
    }

    #[test]
    fn test_parse_value_date_converts_to_utc() {
        let parsed = parse_value_date("2016-06-22+0200").unwrap();
        assert_eq!(parsed.format(VALUE_DATE_FORMAT).to_string(), "2016-06-21T22:00:00Z");

        let parsed = parse_value_date("2016-06-22-0500").unwrap();
        assert_eq!(parsed.format(VALUE_DATE_FORMAT).to_string(), "2016-06-22T05:00:00Z");
    }

    #[test]
    fn test_parse_value_date_rejects_malformed_input() {
        assert_eq!(parse_value_date("2016-06-22"), None);
        assert_eq!(parse_value_date(""), None);
        assert_eq!(parse_value_date("22.06.2016+0200"), None);
        assert_eq!(parse_value_date("2016-06-22junk"), None);
    }

    #[tokio::test]
    async fn test_absent_statement_yields_empty_streams() {
        assert!(collect(extract_transactions(None, "demo")).await.is_empty());
        assert!(collect(extract_accounts(None)).await.is_empty());
    }

    #[tokio::test]
    async fn test_positive_amount_credits_own_account() {
        let transactions = collect(extract_transactions(
            statement(vec![record(Some(1), Some(400.0), Some("19-2000145399"))]),
            "demo",
        ))
        .await;

        assert_eq!(transactions.len(), 1);
        let transfer = &transactions[0].transfers[0];
        assert_eq!(transfer.credit.name, "CZ9620100000002400222233");
        assert_eq!(transfer.debit.name, "CZ6508000000192000145399");
        assert_eq!(transfer.credit.tenant, "demo");
        assert_eq!(transfer.amount, 400.0);
        assert_eq!(transfer.currency, "CZK");
        assert_eq!(transfer.value_date, "2016-06-21T22:00:00Z");
    }

    #[tokio::test]
    async fn test_negative_amount_debits_own_account() {
        let transactions = collect(extract_transactions(
            statement(vec![record(Some(1), Some(-50.0), Some("19-2000145399"))]),
            "demo",
        ))
        .await;

        let transfer = &transactions[0].transfers[0];
        assert_eq!(transfer.debit.name, "CZ9620100000002400222233");
        assert_eq!(transfer.credit.name, "CZ6508000000192000145399");
        assert_eq!(transfer.amount, 50.0);
    }

    #[tokio::test]
    async fn test_fee_record_uses_bic_as_counter_party() {
        let transactions = collect(extract_transactions(
            statement(vec![record(Some(1), Some(-12.5), None)]),
            "demo",
        ))
        .await;

        assert_eq!(transactions[0].transfers[0].credit.name, "FIOBCZPPXXX");
    }

    #[tokio::test]
    async fn test_records_without_id_or_amount_are_skipped() {
        let transactions = collect(extract_transactions(
            statement(vec![
                record(None, Some(100.0), None),
                record(Some(7), None, None),
                record(Some(8), Some(1.0), None),
            ]),
            "demo",
        ))
        .await;

        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].transfers[0].id, "8");
    }

    #[tokio::test]
    async fn test_adjacent_records_group_into_one_transaction() {
        let transactions = collect(extract_transactions(
            statement(vec![
                record(Some(10), Some(100.0), None),
                record(Some(10), Some(-100.0), None),
                record(Some(11), Some(5.0), None),
                record(Some(10), Some(1.0), None),
            ]),
            "demo",
        ))
        .await;

        // the two leading records share an id, the trailing repeat does not rejoin them
        assert_eq!(transactions.len(), 3);
        assert_eq!(transactions[0].id, "CZ962010000000240022223310");
        assert_eq!(transactions[0].transfers.len(), 2);
        assert_eq!(transactions[1].id, "CZ962010000000240022223311");
        assert_eq!(transactions[1].transfers.len(), 1);
        assert_eq!(transactions[2].id, "CZ962010000000240022223310");
        assert_eq!(transactions[2].transfers.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_value_date_falls_back_to_pass_time() {
        let mut dateless = record(Some(3), Some(9.0), None);
        dateless.column0 = None;
        let before = Utc::now();
        let transactions = collect(extract_transactions(statement(vec![dateless]), "demo")).await;
        let after = Utc::now();

        let value_date = &transactions[0].transfers[0].value_date;
        let parsed = DateTime::parse_from_str(
            &value_date.replace('Z', "+0000"),
            "%Y-%m-%dT%H:%M:%S%z",
        )
        .unwrap()
        .with_timezone(&Utc);
        assert!(parsed >= before - chrono::Duration::seconds(1));
        assert!(parsed <= after + chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_accounts_deduplicate_on_normalized_name() {
        let accounts = collect(extract_accounts(statement(vec![
            record(Some(1), Some(10.0), Some("19-2000145399")),
            record(Some(2), Some(20.0), Some("19-2000145399")),
            record(Some(3), Some(-5.0), None),
        ])))
        .await;

        let names: HashSet<String> = accounts.iter().map(|a| a.name.clone()).collect();
        assert_eq!(accounts.len(), 3);
        assert_eq!(
            names,
            HashSet::from([
                "CZ6508000000192000145399".to_string(),
                "FIOBCZPPXXX".to_string(),
                "CZ9620100000002400222233".to_string(),
            ])
        );
    }

    #[tokio::test]
    async fn test_account_formats_follow_normalization_outcome() {
        let accounts = collect(extract_accounts(statement(vec![
            record(Some(1), Some(10.0), Some("19-2000145399")),
            record(Some(2), Some(-5.0), None),
        ])))
        .await;

        for account in &accounts {
            let expected = match account.name.as_str() {
                "FIOBCZPPXXX" => AccountFormat::FioUnknown,
                _ => AccountFormat::Iban,
            };
            assert_eq!(account.format, expected, "for {}", account.name);
            assert_eq!(account.currency, "CZK");
            assert!(!account.is_balance_check);
        }
    }

    #[tokio::test]
    async fn test_empty_statement_still_yields_own_account() {
        let accounts = collect(extract_accounts(statement(vec![]))).await;

        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].name, "CZ9620100000002400222233");
        assert_eq!(accounts[0].format, AccountFormat::Iban);
    }

    #[tokio::test]
    async fn test_closing_the_stream_stops_the_producer() {
        let records: Vec<TransferRecord> = (1..=64)
            .map(|id| record(Some(id), Some(1.0), None))
            .collect();
        let mut stream = extract_transactions(statement(records), "demo");

        assert!(stream.next().await.is_some());
        stream.close();

        let deadline = tokio::time::Instant::now() + std::time::Duration::from_secs(1);
        while !stream.is_finished() {
            assert!(tokio::time::Instant::now() < deadline, "producer kept running");
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_streams_implement_futures_stream() {
        use futures::StreamExt;

        let stream = extract_transactions(
            statement(vec![
                record(Some(1), Some(1.0), None),
                record(Some(2), Some(2.0), None),
            ]),
            "demo",
        );
        let collected: Vec<Transaction> = stream.collect().await;
        assert_eq!(collected.len(), 2);
    }
}
