//! Pipeline stages: load, filter and reconcile.

pub mod filter;
pub mod load;
pub mod validator;

pub use filter::filter;
pub use load::{load, load_files, resolve_files};
pub use validator::{CheckpointOutcome, CheckpointStatus, ValidationReport, validate};

use crate::log::RunLog;
use crate::models::{Configuration, TransactionCollection};

/// Transactions of one run and, if requested, their reconciliation.
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    pub transactions: TransactionCollection,
    pub report: Option<ValidationReport>,
}

/// Load, sort by date, filter, and reconcile when `config.validate` is set.
pub fn run(config: &Configuration, log: &RunLog) -> RunOutput {
    let mut transactions = load(config, log);
    transactions.sort_by_date();
    let transactions = filter(transactions, config.date_window(), log);

    let report = config
        .validate
        .then(|| validate(&transactions, config, log));

    RunOutput {
        transactions,
        report,
    }
}
