//! Ledger record and output-table types.

use chrono::NaiveDate;
use serde::Serialize;

use crate::category::{Category, classify};

/// Date pattern used by ledger exports (`17/03/2024`).
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// One ledger line with its category derived from the label.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Transaction {
    /// Parsed date, used only for ordering.
    pub date: NaiveDate,
    /// Date exactly as it appeared in the source file; output re-emits
    /// this, never a re-rendered date.
    pub date_raw: String,
    /// Free-text description, original casing and spacing preserved.
    pub label: String,
    /// Amount withdrawn, verbatim (may be empty).
    pub debit: String,
    /// Amount deposited, verbatim (may be empty).
    pub credit: String,
    // Derived from `label` in the constructor; never set independently.
    category: Category,
}

impl Transaction {
    /// Build a transaction from raw ledger fields, parsing the date.
    ///
    /// The category is computed here and nowhere else; labels matching no
    /// rule fall back to [`Category::Other`].
    pub fn from_fields(
        date_raw: impl Into<String>,
        label: impl Into<String>,
        debit: impl Into<String>,
        credit: impl Into<String>,
    ) -> Result<Self, chrono::ParseError> {
        let date_raw = date_raw.into();
        let date = NaiveDate::parse_from_str(&date_raw, DATE_FORMAT)?;
        let label = label.into();
        let category = classify(&label).unwrap_or(Category::Other);

        Ok(Self {
            date,
            date_raw,
            label,
            debit: debit.into(),
            credit: credit.into(),
            category,
        })
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Debit as a number; empty or unparseable fields count as zero.
    pub fn debit_amount(&self) -> f64 {
        parse_amount(&self.debit)
    }

    /// Credit as a number; empty or unparseable fields count as zero.
    pub fn credit_amount(&self) -> f64 {
        parse_amount(&self.credit)
    }

    /// Render as an output row: date, label, category, debit, credit.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date_raw.clone(),
            self.label.clone(),
            self.category.to_string(),
            self.debit.clone(),
            self.credit.clone(),
        ]
    }
}

fn parse_amount(s: &str) -> f64 {
    s.parse().unwrap_or(0.0)
}

/// The loader's output: one header row plus date-sorted transactions,
/// immutable once built and handed to the publisher as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerTable {
    header: Vec<String>,
    transactions: Vec<Transaction>,
}

impl LedgerTable {
    /// `header` must already carry the category column and `transactions`
    /// must already be date-sorted; the loader is the only producer.
    pub fn new(header: Vec<String>, transactions: Vec<Transaction>) -> Self {
        Self {
            header,
            transactions,
        }
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Header plus data rows, the exact matrix uploaded to the sheet.
    pub fn rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.transactions.len() + 1);
        rows.push(self.header.clone());
        rows.extend(self.transactions.iter().map(Transaction::to_row));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date_raw: &str, label: &str, debit: &str, credit: &str) -> Transaction {
        Transaction::from_fields(date_raw, label, debit, credit).unwrap()
    }

    #[test]
    fn test_category_derived_from_label() {
        assert_eq!(txn("01/01/2024", "Rent", "1000", "0").category(), Category::Housing);
        assert_eq!(txn("01/01/2024", "Salary", "0", "2000").category(), Category::Income);
    }

    #[test]
    fn test_unmatched_label_defaults_to_other() {
        let t = txn("01/01/2024", "mystery merchant", "12", "0");
        assert_eq!(t.category(), Category::Other);
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Transaction::from_fields("32/13/2024", "Rent", "100", "0").is_err());
        assert!(Transaction::from_fields("2024-01-01", "Rent", "100", "0").is_err());
    }

    #[test]
    fn test_unpadded_date_kept_verbatim() {
        let t = txn("1/1/2024", "Rent", "1000", "0");
        assert_eq!(t.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(t.to_row()[0], "1/1/2024");
    }

    #[test]
    fn test_amount_helpers() {
        let t = txn("01/01/2024", "Salary", "", "2000");
        assert_eq!(t.debit_amount(), 0.0);
        assert_eq!(t.credit_amount(), 2000.0);
        assert_eq!(txn("01/01/2024", "Rent", "12.50", "0").debit_amount(), 12.5);
    }

    #[test]
    fn test_to_row_shape() {
        let t = txn("01/01/2024", "Rent", "1000", "0");
        assert_eq!(t.to_row(), vec!["01/01/2024", "Rent", "Housing", "1000", "0"]);
    }

    #[test]
    fn test_rows_start_with_header() {
        let header: Vec<String> = ["Date", "Item", "Category", "Debit", "Credit"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let table = LedgerTable::new(header.clone(), vec![txn("01/01/2024", "Rent", "1000", "0")]);

        let rows = table.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], header);
        assert_eq!(rows[1][2], "Housing");
    }

    #[test]
    fn test_transaction_serializes_with_category() {
        let json = serde_json::to_value(txn("01/01/2024", "Rent", "1000", "0")).unwrap();
        assert_eq!(json["category"], "Housing");
        assert_eq!(json["date_raw"], "01/01/2024");
    }
}
