//! Semicolon-delimited ledger loader.
//!
//! Expected shape, one header line then data lines:
//!   Date;Item;Debit;Credit
//!   17/03/2024;Rent;1000;0

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tally_core::{LedgerTable, Transaction};
use thiserror::Error;

/// Errors aborting a ledger load. The load is all-or-nothing: the first
/// error wins and no partial table is ever returned.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: expected at least 4 fields, found {found}")]
    TooFewFields { line: usize, found: usize },

    #[error("line {line}: invalid date {value:?}, expected DD/MM/YYYY")]
    InvalidDate { line: usize, value: String },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
}

/// Load a ledger file and categorize every row.
pub fn load_ledger(path: impl AsRef<Path>) -> Result<LedgerTable, LedgerError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| LedgerError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_ledger(file)
}

/// Parse ledger rows from any reader. Split out from [`load_ledger`] so
/// tests can feed in-memory input.
pub fn parse_ledger<R: Read>(reader: R) -> Result<LedgerTable, LedgerError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    // The header line is consumed as-is; the schema is not validated.
    let mut header: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut transactions = Vec::new();
    for (idx, record) in rdr.records().enumerate() {
        let record = record?;
        let line = idx + 2; // 1-based, the header is line 1

        if record.len() < 4 {
            return Err(LedgerError::TooFewFields {
                line,
                found: record.len(),
            });
        }

        let txn = Transaction::from_fields(&record[0], &record[1], &record[2], &record[3])
            .map_err(|_| LedgerError::InvalidDate {
                line,
                value: record[0].to_string(),
            })?;
        transactions.push(txn);
    }

    // Stable sort: rows sharing a date keep their file order.
    transactions.sort_by_key(|t| t.date);

    // The derived category column sits between Item and Debit. A header
    // shorter than two fields gets it appended instead.
    let at = header.len().min(2);
    header.insert(at, "Category".to_string());

    Ok(LedgerTable::new(header, transactions))
}
