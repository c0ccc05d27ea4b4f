//! Decoded gateway statement envelope.
//!
//! Shape of `GET /last/{token}/transactions.json`: a header with account
//! identity and balance range, then an ordered list of transfer records.
//! Every record field arrives as a positional `columnN` node carrying a typed
//! `value` plus the gateway's display `name` and numeric `id`. Absent fields
//! are either missing or `null`, both decode to `None`.

use serde::{Deserialize, Deserializer};

/// Top-level envelope of one statement download.
#[derive(Debug, Clone, Deserialize)]
pub struct FioStatement {
    #[serde(rename = "accountStatement")]
    pub account_statement: AccountStatement,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountStatement {
    pub info: StatementInfo,
    #[serde(rename = "transactionList")]
    pub transaction_list: TransferList,
}

/// Statement header: whose account this is and what id range was downloaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatementInfo {
    pub account_id: String,
    pub bank_id: String,
    pub currency: String,
    pub iban: String,
    pub bic: String,
    #[serde(default)]
    pub opening_balance: f64,
    #[serde(default)]
    pub closing_balance: f64,
    #[serde(default)]
    pub id_from: Option<i64>,
    #[serde(default)]
    pub id_to: Option<i64>,
    #[serde(default)]
    pub id_last_download: Option<i64>,
}

/// The gateway labels the record list `transaction` even though each entry
/// is a single transfer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferList {
    #[serde(rename = "transaction", default, deserialize_with = "nullable_vec")]
    pub transfers: Vec<TransferRecord>,
}

/// One positional column node: typed value plus gateway metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct Column<T> {
    pub value: T,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: i32,
}

impl<T> Column<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            name: String::new(),
            id: 0,
        }
    }
}

/// One transfer record, fields keyed by gateway column position.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferRecord {
    /// Value date as `YYYY-MM-DD` plus a `±HHMM` zone offset.
    pub column0: Option<Column<String>>,
    /// Signed amount in statement currency.
    pub column1: Option<Column<f64>>,
    /// Counter-party account number, domestic form.
    pub column2: Option<Column<String>>,
    /// Counter-party bank code.
    pub column3: Option<Column<String>>,
    /// Constant symbol.
    pub column4: Option<Column<String>>,
    /// Variable symbol.
    pub column5: Option<Column<String>>,
    /// Specific symbol.
    pub column6: Option<Column<String>>,
    /// User identification.
    pub column7: Option<Column<String>>,
    /// Transfer type label.
    pub column8: Option<Column<String>>,
    /// Who performed the transfer.
    pub column9: Option<Column<String>>,
    /// Counter-party display name.
    pub column10: Option<Column<String>>,
    /// Counter-party bank name.
    pub column12: Option<Column<String>>,
    /// Transfer currency.
    pub column14: Option<Column<String>>,
    /// Message for the recipient.
    pub column16: Option<Column<String>>,
    /// Transaction sequence id, duplicated by the gateway in column 22.
    pub column17: Option<Column<i64>>,
    /// Free-form note.
    pub column18: Option<Column<String>>,
    /// Transfer sequence id.
    pub column22: Option<Column<i64>>,
    /// Comment.
    pub column25: Option<Column<String>>,
    /// Counter-party BIC.
    pub column26: Option<Column<String>>,
}

impl TransferRecord {
    /// Authoritative transfer sequence id: column 22, falling back to the
    /// column 17 duplicate when 22 is absent.
    pub fn transfer_id(&self) -> Option<i64> {
        self.column22
            .as_ref()
            .or(self.column17.as_ref())
            .map(|column| column.value)
    }

    pub fn amount(&self) -> Option<f64> {
        self.column1.as_ref().map(|column| column.value)
    }

    pub fn counter_party(&self) -> Option<&str> {
        self.column2.as_ref().map(|column| column.value.as_str())
    }

    pub fn counter_party_bank_code(&self) -> Option<&str> {
        self.column3.as_ref().map(|column| column.value.as_str())
    }

    pub fn value_date_raw(&self) -> Option<&str> {
        self.column0.as_ref().map(|column| column.value.as_str())
    }
}

impl FioStatement {
    pub fn info(&self) -> &StatementInfo {
        &self.account_statement.info
    }

    pub fn transfers(&self) -> &[TransferRecord] {
        &self.account_statement.transaction_list.transfers
    }

    /// Highest transfer sequence id present in this statement, the value the
    /// import cursor moves to once everything is delivered downstream.
    pub fn max_transfer_id(&self) -> Option<i64> {
        self.transfers()
            .iter()
            .filter_map(TransferRecord::transfer_id)
            .max()
    }
}

/// The gateway sends `"transaction": null` for statements without records.
fn nullable_vec<'de, D>(deserializer: D) -> Result<Vec<TransferRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let records: Option<Vec<TransferRecord>> = Option::deserialize(deserializer)?;
    Ok(records.unwrap_or_default())
}

// ============================================================
// Tests
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    const STATEMENT_FIXTURE: &str = r#"{
        "accountStatement": {
            "info": {
                "accountId": "2400222233",
                "bankId": "2010",
                "currency": "CZK",
                "iban": "CZ9620100000002400222233",
                "bic": "FIOBCZPPXXX",
                "openingBalance": 1000.0,
                "closingBalance": 1400.0,
                "idFrom": 4420340001,
                "idTo": 4420340002,
                "idLastDownload": null
            },
            "transactionList": {
                "transaction": [
                    {
                        "column0": {"value": "2016-06-22+0200", "name": "Datum", "id": 0},
                        "column1": {"value": 400.0, "name": "Objem", "id": 1},
                        "column2": {"value": "19-2000145399", "name": "Protiúčet", "id": 2},
                        "column3": {"value": "0800", "name": "Kód banky", "id": 3},
                        "column17": {"value": 2210098765, "name": "ID pokynu", "id": 17},
                        "column22": {"value": 4420340002, "name": "ID pohybu", "id": 22}
                    },
                    {
                        "column0": {"value": "2016-06-21+0200", "name": "Datum", "id": 0},
                        "column1": {"value": -12.5, "name": "Objem", "id": 1},
                        "column2": null,
                        "column17": {"value": 2210098764, "name": "ID pokynu", "id": 17}
                    }
                ]
            }
        }
    }"#;

    #[test]
    fn test_decodes_statement_header() {
        let statement: FioStatement = serde_json::from_str(STATEMENT_FIXTURE).unwrap();
        let info = statement.info();

        assert_eq!(info.account_id, "2400222233");
        assert_eq!(info.bank_id, "2010");
        assert_eq!(info.iban, "CZ9620100000002400222233");
        assert_eq!(info.bic, "FIOBCZPPXXX");
        assert_eq!(info.opening_balance, 1000.0);
        assert_eq!(info.id_from, Some(4420340001));
        assert_eq!(info.id_last_download, None);
    }

    #[test]
    fn test_decodes_transfer_records() {
        let statement: FioStatement = serde_json::from_str(STATEMENT_FIXTURE).unwrap();
        let records = statement.transfers();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amount(), Some(400.0));
        assert_eq!(records[0].counter_party(), Some("19-2000145399"));
        assert_eq!(records[0].counter_party_bank_code(), Some("0800"));
        assert_eq!(records[0].value_date_raw(), Some("2016-06-22+0200"));
        assert_eq!(records[1].amount(), Some(-12.5));
        assert_eq!(records[1].counter_party(), None);
    }

    #[test]
    fn test_transfer_id_prefers_column_22() {
        let statement: FioStatement = serde_json::from_str(STATEMENT_FIXTURE).unwrap();

        assert_eq!(statement.transfers()[0].transfer_id(), Some(4420340002));
        assert_eq!(statement.transfers()[1].transfer_id(), Some(2210098764));
    }

    #[test]
    fn test_max_transfer_id_spans_both_id_columns() {
        let statement: FioStatement = serde_json::from_str(STATEMENT_FIXTURE).unwrap();
        assert_eq!(statement.max_transfer_id(), Some(4420340002));
    }

    #[test]
    fn test_tolerates_null_record_list() {
        let raw = r#"{
            "accountStatement": {
                "info": {
                    "accountId": "2400222233",
                    "bankId": "2010",
                    "currency": "CZK",
                    "iban": "CZ9620100000002400222233",
                    "bic": "FIOBCZPPXXX",
                    "openingBalance": 0.0,
                    "closingBalance": 0.0,
                    "idFrom": null,
                    "idTo": null
                },
                "transactionList": {"transaction": null}
            }
        }"#;
        let statement: FioStatement = serde_json::from_str(raw).unwrap();

        assert!(statement.transfers().is_empty());
        assert_eq!(statement.max_transfer_id(), None);
        assert_eq!(statement.info().id_from, None);
    }

    #[test]
    fn test_record_with_all_columns_missing() {
        let statement: FioStatement = serde_json::from_str(
            r#"{
                "accountStatement": {
                    "info": {
                        "accountId": "2400222233",
                        "bankId": "2010",
                        "currency": "CZK",
                        "iban": "CZ9620100000002400222233",
                        "bic": "FIOBCZPPXXX"
                    },
                    "transactionList": {"transaction": [{}]}
                }
            }"#,
        )
        .unwrap();
        let record = &statement.transfers()[0];

        assert_eq!(record.transfer_id(), None);
        assert_eq!(record.amount(), None);
        assert_eq!(record.counter_party(), None);
    }
}
