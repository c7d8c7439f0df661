//! Per-category totals over a loaded ledger.

use std::collections::HashMap;

use tally_core::{Category, LedgerTable};

/// Aggregated debits and credits for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub debit: f64,
    pub credit: f64,
    pub count: usize,
}

/// Total debits and credits per category, largest debit first.
pub fn summarize(table: &LedgerTable) -> Vec<CategoryTotal> {
    let mut groups: HashMap<Category, CategoryTotal> = HashMap::new();

    for txn in table.transactions() {
        let entry = groups.entry(txn.category()).or_insert_with(|| CategoryTotal {
            category: txn.category(),
            debit: 0.0,
            credit: 0.0,
            count: 0,
        });
        entry.debit += txn.debit_amount();
        entry.credit += txn.credit_amount();
        entry.count += 1;
    }

    let mut totals: Vec<CategoryTotal> = groups.into_values().collect();
    totals.sort_by(|a, b| b.debit.partial_cmp(&a.debit).unwrap());
    totals
}
