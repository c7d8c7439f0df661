//! tally-ledger: ledger file loading, categorization, and aggregation.

pub mod loader;
pub mod summary;

pub use loader::{LedgerError, load_ledger, parse_ledger};
pub use summary::{CategoryTotal, summarize};
