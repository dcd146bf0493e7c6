//! Reconciliation of extracted transactions against configured balances.
//!
//! Each institute may list balance checkpoints. For every consecutive pair the
//! start balance plus the transactions booked in `[start, end]` must equal the
//! end balance, optionally within the end checkpoint's margin.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::locale::format_amount;
use crate::log::RunLog;
use crate::models::{Checkpoint, Configuration, DateWindow, Transaction, TransactionCollection};

/// Result of comparing one checkpoint window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckpointStatus {
    Passed,
    /// Off by at most the configured margin, in the margin's direction.
    PassedWithinMargin { difference: Decimal },
    Failed {
        difference: Decimal,
        /// Every transaction that contributed to the computed balance.
        transaction_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointOutcome {
    pub institute: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub expected: Decimal,
    pub computed: Decimal,
    #[serde(flatten)]
    pub status: CheckpointStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub outcomes: Vec<CheckpointOutcome>,
    pub error_count: usize,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }
}

/// Compare the collection with every configured checkpoint window.
///
/// Windows not fully inside the run's date filter and institutes without
/// transactions are skipped. Mismatches are logged as errors; the collection
/// is never modified.
pub fn validate(collection: &TransactionCollection, config: &Configuration, log: &RunLog) -> ValidationReport {
    let mut report = ValidationReport::default();
    let run_window = config.date_window();

    for (institute, settings) in &config.institutes {
        if settings.validate.is_empty() {
            continue;
        }

        let mut checkpoints = settings.validate.clone();
        checkpoints.sort_by_key(|c| c.date);
        if checkpoints.len() < 2 {
            log.info(format_args!("{}: a single checkpoint defines no window", institute));
            continue;
        }

        let transactions: Vec<&Transaction> = collection
            .iter()
            .filter(|t| {
                t.owner()
                    .institute()
                    .is_some_and(|name| name.eq_ignore_ascii_case(institute))
            })
            .collect();
        if transactions.is_empty() {
            log.info(format_args!("{}: no transactions, nothing to validate", institute));
            continue;
        }

        for pair in checkpoints.windows(2) {
            let (start, end) = (&pair[0], &pair[1]);
            if !run_window.contains(start.date) || !run_window.contains(end.date) {
                log.info(format_args!(
                    "{}: window {}..{} outside the date filter, skipped",
                    institute, start.date, end.date
                ));
                continue;
            }

            let outcome = check_window(institute, start, end, &transactions, log);
            if matches!(outcome.status, CheckpointStatus::Failed { .. }) {
                report.error_count += 1;
            }
            report.outcomes.push(outcome);
        }
    }

    report
}

fn check_window(
    institute: &str,
    start: &Checkpoint,
    end: &Checkpoint,
    transactions: &[&Transaction],
    log: &RunLog,
) -> CheckpointOutcome {
    let window = DateWindow::new(Some(start.date), Some(end.date));
    let selected: Vec<&Transaction> = transactions
        .iter()
        .copied()
        .filter(|t| window.contains(t.date()))
        .collect();

    let computed = (start.value + selected.iter().map(|t| t.value()).sum::<Decimal>()).round_dp(2);
    let difference = computed - end.value;
    let label = format!("{} {}..{}", institute, start.date, end.date);

    let status = if difference.is_zero() {
        log.success(format_args!("{}: balance {} matches", label, format_amount(computed)));
        CheckpointStatus::Passed
    } else if within_margin(difference, end.margin) {
        log.warning(format_args!(
            "{}: balance {} differs from {} by {}, within margin {}",
            label,
            format_amount(computed),
            format_amount(end.value),
            format_amount(difference),
            format_amount(end.margin)
        ));
        CheckpointStatus::PassedWithinMargin { difference }
    } else {
        log.error(format_args!(
            "{}: balance {} differs from expected {} by {}",
            label,
            format_amount(computed),
            format_amount(end.value),
            format_amount(difference)
        ));
        for t in &selected {
            log.info(format_args!(
                "  {} {} {} {} {}",
                t.id(),
                t.date(),
                format_amount(t.value()),
                t.description(),
                t.source()
            ));
        }
        CheckpointStatus::Failed {
            difference,
            transaction_ids: selected.iter().map(|t| t.id().to_string()).collect(),
        }
    };

    CheckpointOutcome {
        institute: institute.to_string(),
        from: start.date,
        to: end.date,
        expected: end.value,
        computed,
        status,
    }
}

/// A positive margin tolerates upward drift, a negative one downward drift.
fn within_margin(difference: Decimal, margin: Decimal) -> bool {
    if margin.is_sign_positive() && !margin.is_zero() {
        difference > Decimal::ZERO && difference <= margin
    } else if margin.is_sign_negative() && !margin.is_zero() {
        difference < Decimal::ZERO && difference >= margin
    } else {
        false
    }
}
